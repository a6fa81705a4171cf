//! Job coordinator: admits one job per user, runs extraction then upload, records the outcome.

use crate::chat_locks::ChatLocks;
use crate::error::{DriverError, SubmitError};
use crate::extraction::{run_extraction, ExtractionRequest};
use crate::monitor::{MonitorEnd, MonitorSettings};
use crate::progress::ProgressSink;
use crate::registry::{ActiveJobGuard, ActiveJobs};
use crate::upload::{run_upload, UploadRequest};
use relay_core::{
    ChatRef, ForwardTally, Gateway, JobOutcome, JobStatus, JobStore, NewJob, ProfileStore, UserId,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Longest error text written to a job record.
pub const ERROR_TEXT_LIMIT: usize = 300;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Each job downloads its course index into `<download_dir>/job_<id>/`, removed when the
    /// job ends.
    pub download_dir: PathBuf,
    pub monitor: MonitorSettings,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("/tmp"),
            monitor: MonitorSettings::default(),
        }
    }
}

/// Why a job failed, classified for the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    #[error("access token expired")]
    TokenExpired,

    #[error("course '{course}' not found. Available:\n{listing_excerpt}")]
    CourseNotFound {
        course: String,
        listing_excerpt: String,
    },

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl JobFailure {
    fn from_extraction(e: DriverError) -> Self {
        match e {
            DriverError::TokenExpired => JobFailure::TokenExpired,
            DriverError::CourseNotFound {
                course,
                listing_excerpt,
            } => JobFailure::CourseNotFound {
                course,
                listing_excerpt,
            },
            DriverError::StepTimeout { .. } => JobFailure::ExtractionFailed(e.to_string()),
            DriverError::Relay(e) => JobFailure::Unexpected(e.to_string()),
        }
    }

    fn from_upload(e: DriverError) -> Self {
        match e {
            DriverError::Relay(e) => JobFailure::Unexpected(e.to_string()),
            other => JobFailure::UploadFailed(other.to_string()),
        }
    }

    /// Error text as stored on the job record.
    pub fn record_text(&self) -> String {
        self.to_string().chars().take(ERROR_TEXT_LIMIT).collect()
    }
}

/// Terminal result of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job_id: i64,
    pub status: JobStatus,
    pub tally: ForwardTally,
    /// How the monitor loop ended; `None` when the job failed before it.
    pub end: Option<MonitorEnd>,
    pub failure: Option<JobFailure>,
}

pub enum Submission {
    /// The user already has a job running; nothing was created.
    Rejected,
    Accepted {
        job_id: i64,
        handle: JoinHandle<JobReport>,
    },
}

/// Everything one job needs, validated at submission.
struct JobPlan {
    user_id: UserId,
    course: String,
    channel: ChatRef,
    token: String,
    extractor: ChatRef,
    uploader: ChatRef,
    command: String,
    credit: String,
}

#[derive(Clone)]
pub struct JobCoordinator {
    gateway: Arc<dyn Gateway>,
    profiles: Arc<dyn ProfileStore>,
    jobs: Arc<dyn JobStore>,
    active: ActiveJobs,
    chat_locks: ChatLocks,
    config: DriverConfig,
}

impl JobCoordinator {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        profiles: Arc<dyn ProfileStore>,
        jobs: Arc<dyn JobStore>,
        config: DriverConfig,
    ) -> Self {
        Self {
            gateway,
            profiles,
            jobs,
            active: ActiveJobs::new(),
            chat_locks: ChatLocks::new(),
            config,
        }
    }

    pub fn active_jobs(&self) -> &ActiveJobs {
        &self.active
    }

    pub fn is_active(&self, user_id: UserId) -> bool {
        self.active.is_active(user_id)
    }

    /// Starts extraction + upload of `course` for `user_id`, forwarding media to `channel`.
    ///
    /// The user's slot is claimed before anything else, so a second submission while one is
    /// running is rejected without creating a record.
    #[instrument(skip(self, channel, progress), fields(channel = %channel))]
    pub async fn submit(
        &self,
        user_id: UserId,
        course: &str,
        channel: &ChatRef,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Submission, SubmitError> {
        let Some(guard) = self.active.claim(user_id) else {
            info!(user_id = user_id, "Job already running, submission rejected");
            return Ok(Submission::Rejected);
        };

        let plan = self.plan(user_id, course, channel).await?;

        let job_id = self
            .jobs
            .create_running(&NewJob {
                user_id,
                course: plan.course.clone(),
                channel_id: plan.channel.to_string(),
            })
            .await?;
        guard.assign(job_id);
        info!(user_id = user_id, job_id = job_id, course = %course, "Job started");

        let worker = JobWorker {
            job_dir: job_dir(&self.config.download_dir, job_id),
            gateway: Arc::clone(&self.gateway),
            jobs: Arc::clone(&self.jobs),
            chat_locks: self.chat_locks.clone(),
            config: self.config.clone(),
            progress,
            plan,
        };
        let handle = tokio::spawn(worker.run(job_id, guard));

        Ok(Submission::Accepted { job_id, handle })
    }

    async fn plan(
        &self,
        user_id: UserId,
        course: &str,
        channel: &ChatRef,
    ) -> Result<JobPlan, SubmitError> {
        let profile = self
            .profiles
            .profile(user_id)
            .await?
            .ok_or_else(|| SubmitError::Incomplete(vec!["profile"]))?;

        let missing = profile.missing_fields();
        let (Some(token), Some(command), Some(credit)) =
            (profile.token, profile.uploader_command, profile.credit)
        else {
            return Err(SubmitError::Incomplete(missing));
        };
        if !missing.is_empty() {
            return Err(SubmitError::Incomplete(missing));
        }

        Ok(JobPlan {
            user_id,
            course: course.to_string(),
            channel: channel.clone(),
            token,
            extractor: ChatRef::new(profile.extractor_bot),
            uploader: ChatRef::new(profile.uploader_bot),
            command,
            credit,
        })
    }
}

/// Private working directory of one job.
pub fn job_dir(download_dir: &Path, job_id: i64) -> PathBuf {
    download_dir.join(format!("job_{}", job_id))
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

struct JobWorker {
    job_dir: PathBuf,
    gateway: Arc<dyn Gateway>,
    jobs: Arc<dyn JobStore>,
    chat_locks: ChatLocks,
    config: DriverConfig,
    progress: Arc<dyn ProgressSink>,
    plan: JobPlan,
}

impl JobWorker {
    async fn run(self, job_id: i64, guard: ActiveJobGuard) -> JobReport {
        let executed = match AssertUnwindSafe(self.execute()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let text = panic_text(payload.as_ref());
                error!(job_id = job_id, panic = %text, "Job task panicked");
                Err(JobFailure::Unexpected(format!("job panicked: {}", text)))
            }
        };
        remove_job_dir(&self.job_dir).await;

        let report = match executed {
            Ok((tally, end)) => JobReport {
                job_id,
                status: JobStatus::Done,
                tally,
                end: Some(end),
                failure: None,
            },
            Err(failure) => {
                warn!(
                    job_id = job_id,
                    user_id = self.plan.user_id,
                    error = %failure,
                    "Job failed"
                );
                JobReport {
                    job_id,
                    status: JobStatus::Failed,
                    tally: ForwardTally::default(),
                    end: None,
                    failure: Some(failure),
                }
            }
        };

        let outcome = JobOutcome {
            status: report.status,
            tally: report.tally,
            error: report.failure.as_ref().map(JobFailure::record_text),
        };
        if let Err(e) = self.jobs.finalize(job_id, &outcome).await {
            error!(error = %e, job_id = job_id, "Failed to finalize job record");
        }
        drop(guard);

        info!(
            job_id = job_id,
            status = %report.status,
            videos = report.tally.videos,
            pdfs = report.tally.pdfs,
            "Job finished"
        );
        report
    }

    async fn execute(&self) -> Result<(ForwardTally, MonitorEnd), JobFailure> {
        let plan = &self.plan;
        let gateway = self.gateway.as_ref();
        let progress = self.progress.as_ref();

        let artifact = {
            let _lock = self.lock_chat(&plan.extractor).await;
            run_extraction(
                gateway,
                &ExtractionRequest {
                    bot: &plan.extractor,
                    token: &plan.token,
                    course: &plan.course,
                    download_dir: &self.job_dir,
                },
                progress,
            )
            .await
            .map_err(JobFailure::from_extraction)?
        };

        let channels = [plan.channel.clone()];
        let uploaded = {
            let _lock = self.lock_chat(&plan.uploader).await;
            run_upload(
                gateway,
                &UploadRequest {
                    bot: &plan.uploader,
                    command: &plan.command,
                    artifact: &artifact,
                    course: &plan.course,
                    credit: &plan.credit,
                    token: &plan.token,
                    channels: &channels,
                },
                self.config.monitor,
                progress,
            )
            .await
        };

        let report = uploaded.map_err(JobFailure::from_upload)?;
        Ok((report.tally, report.end))
    }

    /// Waits for exclusive use of `chat`, telling the operator when another job holds it.
    async fn lock_chat(&self, chat: &ChatRef) -> OwnedMutexGuard<()> {
        if let Some(guard) = self.chat_locks.try_acquire(chat) {
            return guard;
        }
        info!(chat = %chat, "Bot busy with another job, waiting");
        self.progress
            .status(&format!("Waiting for {} (busy with another job)", chat))
            .await;
        self.chat_locks.acquire(chat).await
    }
}

async fn remove_job_dir(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, path = %dir.display(), "Failed to remove job directory"),
    }
}
