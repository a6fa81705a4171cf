//! Active-job registry: at most one running job per user.

use relay_core::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Process-wide map of user → job id. A claimed slot has no job id until the record exists.
#[derive(Clone, Default)]
pub struct ActiveJobs {
    slots: Arc<Mutex<HashMap<UserId, Option<i64>>>>,
}

impl ActiveJobs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Option<i64>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the user's slot. `None` when the user already has one.
    pub fn claim(&self, user_id: UserId) -> Option<ActiveJobGuard> {
        let mut slots = self.lock();
        if slots.contains_key(&user_id) {
            return None;
        }
        slots.insert(user_id, None);
        debug!(user_id = user_id, "Job slot claimed");
        Some(ActiveJobGuard {
            jobs: self.clone(),
            user_id,
        })
    }

    pub fn is_active(&self, user_id: UserId) -> bool {
        self.lock().contains_key(&user_id)
    }

    /// Job id of the user's running job, if its record has been created.
    pub fn job_of(&self, user_id: UserId) -> Option<i64> {
        self.lock().get(&user_id).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Holds a user's slot; dropping it (normally, on error, or while unwinding) frees the slot.
pub struct ActiveJobGuard {
    jobs: ActiveJobs,
    user_id: UserId,
}

impl ActiveJobGuard {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn assign(&self, job_id: i64) {
        self.jobs.lock().insert(self.user_id, Some(job_id));
    }
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        self.jobs.lock().remove(&self.user_id);
        debug!(user_id = self.user_id, "Job slot released");
    }
}
