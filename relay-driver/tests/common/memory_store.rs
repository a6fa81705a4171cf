//! In-memory [`ProfileStore`] + [`JobStore`] and a recording [`ProgressSink`].

use async_trait::async_trait;
use relay_core::{
    ForwardTally, JobOutcome, JobStore, NewJob, ProfileStore, RelayError, Result, UserId,
    UserProfile,
};
use relay_driver::ProgressSink;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct StoredJob {
    pub job: NewJob,
    pub outcome: Option<JobOutcome>,
}

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<UserId, UserProfile>>,
    jobs: Mutex<Vec<StoredJob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_profile(&self, profile: UserProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile);
    }

    pub fn jobs(&self) -> Vec<StoredJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn job(&self, id: i64) -> StoredJob {
        self.jobs.lock().unwrap()[(id - 1) as usize].clone()
    }
}

/// A complete profile for `user_id` targeting the given bots.
pub fn profile(user_id: UserId, extractor: &str, uploader: &str) -> UserProfile {
    UserProfile {
        user_id,
        token: Some("tok.1234567890abcdef".to_string()),
        extractor_bot: extractor.to_string(),
        uploader_bot: uploader.to_string(),
        uploader_command: Some("/upload".to_string()),
        credit: Some("Team Relay".to_string()),
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_running(&self, job: &NewJob) -> Result<i64> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.push(StoredJob {
            job: job.clone(),
            outcome: None,
        });
        Ok(jobs.len() as i64)
    }

    async fn finalize(&self, job_id: i64, outcome: &JobOutcome) -> Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let stored = jobs
            .get_mut((job_id - 1) as usize)
            .ok_or_else(|| RelayError::Database(format!("job {} missing", job_id)))?;
        assert!(stored.outcome.is_none(), "job {} finalized twice", job_id);
        stored.outcome = Some(outcome.clone());
        Ok(())
    }
}

/// Records every status line and tally update.
#[derive(Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<String>>,
    tallies: Mutex<Vec<ForwardTally>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn tallies(&self) -> Vec<ForwardTally> {
        self.tallies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingProgress {
    async fn status(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    async fn tally(&self, tally: ForwardTally) {
        self.tallies.lock().unwrap().push(tally);
    }
}
