//! Data store seams consumed by the job coordinator.
//!
//! `storage` implements both traits on SQLite; tests use in-memory fakes.

use crate::error::Result;
use crate::types::{ForwardTally, JobStatus, UserId, UserProfile};
use async_trait::async_trait;

/// Fields of a job record at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub user_id: UserId,
    pub course: String,
    pub channel_id: String,
}

/// Terminal values written to a job record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub tally: ForwardTally,
    pub error: Option<String>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, user_id: UserId) -> Result<Option<UserProfile>>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts a record in the `running` state and returns its id.
    async fn create_running(&self, job: &NewJob) -> Result<i64>;

    /// Writes status, tallies, error and the finish timestamp.
    async fn finalize(&self, job_id: i64, outcome: &JobOutcome) -> Result<()>;
}
