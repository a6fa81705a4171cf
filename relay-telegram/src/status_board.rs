//! Live status message for one extraction job.
//!
//! The board is created with the id of an already-sent message and edits it in place:
//! the last few log lines while the dialogs run, live tallies while forwarding, and the
//! final report once the job ends.

use async_trait::async_trait;
use relay_core::{Bot, ForwardTally};
use relay_driver::{JobFailure, JobReport, MonitorEnd, ProgressSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Log lines shown on the board.
pub const VISIBLE_LOG_LINES: usize = 5;
const MAX_EDIT_ATTEMPTS: usize = 3;
const FAILURE_TEXT_LIMIT: usize = 300;

pub fn render_started(course: &str, channel: &str) -> String {
    format!(
        "🚀 Extraction Started\n\n📚 {}\n📢 {}\n\n⏳ Initializing... (15-30 min)",
        course, channel
    )
}

pub fn render_running(course: &str, channel: &str, log: &[String]) -> String {
    let start = log.len().saturating_sub(VISIBLE_LOG_LINES);
    let lines: Vec<String> = log[start..].iter().map(|l| format!("  {}", l)).collect();
    format!(
        "⚙️ Running...\n\n📚 {}\n📢 {}\n\nLog:\n{}",
        course,
        channel,
        lines.join("\n")
    )
}

pub fn render_forwarding(course: &str, channel: &str, tally: ForwardTally) -> String {
    format!(
        "📤 Forwarding...\n\n📚 {}\n📢 {}\n\n🎬 Videos: {}\n📄 PDFs: {}\n\nStill running...",
        course, channel, tally.videos, tally.pdfs
    )
}

fn truncate(text: &str) -> String {
    text.chars().take(FAILURE_TEXT_LIMIT).collect()
}

pub fn render_report(course: &str, channel: &str, report: &JobReport) -> String {
    match &report.failure {
        None => {
            let note = match report.end {
                Some(MonitorEnd::DeadlineReached) => "\n\n⏱ Stopped at the time limit.",
                _ => "",
            };
            format!(
                "✅ Done!\n\n📚 {}\n📢 {}\n\n🎬 Videos forwarded: {}\n📄 PDFs forwarded: {}{}\n\nUse /StartExtraction for another batch.",
                course, channel, report.tally.videos, report.tally.pdfs, note
            )
        }
        Some(JobFailure::TokenExpired) => "❌ Token Expired!\n\n\
             The current PW token is expired.\n\
             Please set a new one: /SetToken\n\n\
             Then try /StartExtraction again."
            .to_string(),
        Some(failure @ (JobFailure::CourseNotFound { .. } | JobFailure::ExtractionFailed(_))) => {
            format!(
                "❌ Phase 1 Failed\n\n{}\n\nTry /StartExtraction again.",
                truncate(&failure.to_string())
            )
        }
        Some(failure @ JobFailure::UploadFailed(_)) => format!(
            "❌ Phase 2 Failed\n\n{}\n\nTry /StartExtraction again.",
            truncate(&failure.to_string())
        ),
        Some(failure @ JobFailure::Unexpected(_)) => format!(
            "❌ Unexpected Error\n\n{}\n\nContact admin.",
            truncate(&failure.to_string())
        ),
    }
}

/// True when Telegram returns "message is not modified" (content unchanged); treat as success.
pub fn is_message_not_modified_error(error: &str) -> bool {
    error.contains("message is not modified") || error.contains("exactly the same")
}

/// Parses "Retry after Ns" from a Telegram API error string.
fn extract_retry_after_seconds(error: &str) -> Option<u64> {
    let pattern = "Retry after ";
    let start = error.find(pattern)? + pattern.len();
    let end = error[start..].find('s')?;
    error[start..start + end].trim().parse().ok()
}

pub struct StatusBoard {
    bot: Arc<dyn Bot>,
    chat_id: i64,
    message_id: String,
    course: String,
    channel: String,
    log: Mutex<Vec<String>>,
}

impl StatusBoard {
    pub fn new(
        bot: Arc<dyn Bot>,
        chat_id: i64,
        message_id: String,
        course: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            bot,
            chat_id,
            message_id,
            course: course.into(),
            channel: channel.into(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every status line received so far.
    pub async fn log(&self) -> Vec<String> {
        self.log.lock().await.clone()
    }

    /// Replaces the board with the final report.
    pub async fn finish(&self, report: &JobReport) {
        let text = render_report(&self.course, &self.channel, report);
        self.edit(&text).await;
    }

    /// Edits the board, retrying on rate limits and treating "not modified" as success.
    /// Failures are logged and never reach the job.
    pub async fn edit(&self, text: &str) {
        for _ in 0..MAX_EDIT_ATTEMPTS {
            match self.bot.edit_message(self.chat_id, &self.message_id, text).await {
                Ok(()) => return,
                Err(e) => {
                    let error_str = e.to_string();
                    if is_message_not_modified_error(&error_str) {
                        return;
                    }
                    match extract_retry_after_seconds(&error_str) {
                        Some(retry_secs) => {
                            warn!(error = %e, "Failed to edit status, retrying after {}s", retry_secs);
                            tokio::time::sleep(Duration::from_secs(retry_secs)).await;
                        }
                        None => {
                            error!(error = %e, chat_id = self.chat_id, "Failed to edit status");
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ProgressSink for StatusBoard {
    async fn status(&self, line: &str) {
        let text = {
            let mut log = self.log.lock().await;
            log.push(line.to_string());
            render_running(&self.course, &self.channel, &log)
        };
        self.edit(&text).await;
    }

    async fn tally(&self, tally: ForwardTally) {
        let text = render_forwarding(&self.course, &self.channel, tally);
        self.edit(&text).await;
    }
}
