//! Job record model.
//!
//! Maps to the `jobs` table and is used by JobRepository.

use chrono::{DateTime, Utc};
use relay_core::{ForwardTally, JobStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "batch_name")]
    pub course: String,
    pub channel_id: String,
    pub status: String,
    pub videos_forwarded: i64,
    pub pdfs_forwarded: i64,
    pub error_msg: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Parsed status; unknown strings read as `Pending`.
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.status).unwrap_or(JobStatus::Pending)
    }

    pub fn tally(&self) -> ForwardTally {
        ForwardTally {
            videos: u32::try_from(self.videos_forwarded).unwrap_or(0),
            pdfs: u32::try_from(self.pdfs_forwarded).unwrap_or(0),
        }
    }
}
