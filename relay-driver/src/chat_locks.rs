//! Per-chat serialization for the shared driver identity.
//!
//! Two jobs talking to the same external bot would read each other's replies, so a job holds
//! the bot's lock for the whole phase that talks to it.

use dashmap::DashMap;
use relay_core::ChatRef;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct ChatLocks {
    locks: Arc<DashMap<ChatRef, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `chat`, first dropping entries nobody holds or waits on.
    ///
    /// A guard or a pending `lock_owned` keeps its own `Arc`, so a strong count of one means the
    /// map is the only owner.
    fn lock_for(&self, chat: &ChatRef) -> Arc<Mutex<()>> {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        self.locks.entry(chat.clone()).or_default().clone()
    }

    pub async fn acquire(&self, chat: &ChatRef) -> OwnedMutexGuard<()> {
        self.lock_for(chat).lock_owned().await
    }

    /// Takes the lock only if nobody else holds it.
    pub fn try_acquire(&self, chat: &ChatRef) -> Option<OwnedMutexGuard<()>> {
        self.lock_for(chat).try_lock_owned().ok()
    }
}
