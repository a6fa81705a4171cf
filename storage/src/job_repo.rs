//! Job repository: job records written by the coordinator, and aggregate stats.
//!
//! Implements [`JobStore`] so the coordinator only sees the trait.

use crate::error::StorageError;
use crate::models::{BotStats, JobRecord};
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::Utc;
use relay_core::{JobOutcome, JobStatus, JobStore, NewJob, UserId};
use tracing::info;

#[derive(Clone)]
pub struct JobRepository {
    pool_manager: SqlitePoolManager,
}

impl JobRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Ok(Self { pool_manager })
    }

    pub fn from_pool(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn insert_running(&self, job: &NewJob) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (user_id, batch_name, channel_id, status, started_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.user_id)
        .bind(&job.course)
        .bind(&job.channel_id)
        .bind(JobStatus::Running.as_str())
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        let id = result.last_insert_rowid();
        info!(job_id = id, user_id = job.user_id, course = %job.course, "Job record created");
        Ok(id)
    }

    pub async fn finish(&self, job_id: i64, outcome: &JobOutcome) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, videos_forwarded = ?, pdfs_forwarded = ?, error_msg = ?, finished_at = ?
            WHERE id = ?
            "#,
        )
        .bind(outcome.status.as_str())
        .bind(i64::from(outcome.tally.videos))
        .bind(i64::from(outcome.tally.pdfs))
        .bind(outcome.error.as_deref())
        .bind(Utc::now())
        .bind(job_id)
        .execute(self.pool_manager.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("job {}", job_id)));
        }
        info!(job_id = job_id, status = %outcome.status, "Job record finalized");
        Ok(())
    }

    pub async fn get(&self, job_id: i64) -> Result<Option<JobRecord>, StorageError> {
        let record = sqlx::query_as::<_, JobRecord>("SELECT * FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(record)
    }

    /// Most recent jobs of a user, newest first.
    pub async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<JobRecord>, StorageError> {
        let records = sqlx::query_as::<_, JobRecord>(
            "SELECT * FROM jobs WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, StorageError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(count.0)
    }

    pub async fn stats(&self) -> Result<BotStats, StorageError> {
        let pool = self.pool_manager.pool();

        let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_settings")
            .fetch_one(pool)
            .await?;

        let subscribed: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_settings WHERE is_subscribed = 1")
                .fetch_one(pool)
                .await?;

        let jobs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(pool)
            .await?;

        let done: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = 'done'")
            .fetch_one(pool)
            .await?;

        let forwarded: (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(videos_forwarded), 0), COALESCE(SUM(pdfs_forwarded), 0) FROM jobs",
        )
        .fetch_one(pool)
        .await?;

        Ok(BotStats {
            users: users.0,
            subscribed: subscribed.0,
            jobs: jobs.0,
            done: done.0,
            videos: forwarded.0,
            pdfs: forwarded.1,
        })
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn create_running(&self, job: &NewJob) -> relay_core::Result<i64> {
        Ok(self.insert_running(job).await?)
    }

    async fn finalize(&self, job_id: i64, outcome: &JobOutcome) -> relay_core::Result<()> {
        Ok(self.finish(job_id, outcome).await?)
    }
}
