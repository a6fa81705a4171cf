//! Per-user dialog state: which prompt the operator's next plain-text message answers.

use dashmap::DashMap;
use relay_core::UserId;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Token,
    ExtractorBot,
    UploaderBot,
    UploaderCommand,
    Credit,
    AddBatch,
    DelBatch,
    AddChannel,
    DelChannel,
    /// `/StartExtraction` step 1: a course number.
    SelectBatch,
    /// Step 2: a channel number for the chosen course.
    SelectChannel { course: String },
}

#[derive(Clone, Default)]
pub struct Conversations {
    pending: Arc<DashMap<UserId, Pending>>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever the user was answering before.
    pub fn set(&self, user_id: UserId, pending: Pending) {
        self.pending.insert(user_id, pending);
    }

    pub fn get(&self, user_id: UserId) -> Option<Pending> {
        self.pending.get(&user_id).map(|p| p.value().clone())
    }

    pub fn clear(&self, user_id: UserId) -> Option<Pending> {
        self.pending.remove(&user_id).map(|(_, p)| p)
    }
}
