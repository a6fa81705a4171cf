//! Aggregate statistics over users and jobs.
//!
//! Returned by JobRepository::stats.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotStats {
    pub users: i64,
    pub subscribed: i64,
    pub jobs: i64,
    pub done: i64,
    pub videos: i64,
    pub pdfs: i64,
}
