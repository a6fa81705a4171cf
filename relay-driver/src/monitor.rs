//! Monitor-forward loop: watches the uploader bot's output and fans media out to channels.

use crate::classifier::{is_completion, is_pdf_document};
use crate::progress::ProgressSink;
use crate::wait::Cursor;
use relay_core::{ChatRef, ForwardTally, Gateway, Message};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Upper bound on the whole loop.
    pub deadline: Duration,
    pub cadence: Duration,
    pub window: usize,
    /// Pause after each copy to a destination channel.
    pub pacing: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(2700),
            cadence: Duration::from_secs(5),
            window: 15,
            pacing: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEnd {
    /// The bot sent a completion keyword.
    Completed,
    DeadlineReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    pub tally: ForwardTally,
    pub end: MonitorEnd,
}

#[derive(Debug, Clone, Copy)]
enum MediaKind {
    Video,
    Pdf,
}

fn media_kind(message: &Message) -> Option<MediaKind> {
    if message.is_video() {
        Some(MediaKind::Video)
    } else if is_pdf_document(message) {
        Some(MediaKind::Pdf)
    } else {
        None
    }
}

/// Copies one message to every channel in order. Failures are logged and skipped.
async fn fan_out(
    gateway: &dyn Gateway,
    source: &ChatRef,
    message_id: i64,
    channels: &[ChatRef],
    pacing: Duration,
) {
    for channel in channels {
        if let Err(e) = gateway.copy(source, message_id, channel).await {
            warn!(
                error = %e,
                message_id = message_id,
                channel = %channel,
                "Failed to copy message to channel"
            );
        }
        sleep(pacing).await;
    }
}

/// Watches `cursor`'s chat until a completion keyword arrives or the deadline passes.
///
/// Every tick fetches the newest `window` messages, keeps those above the watermark and handles
/// them oldest-first. Fetch errors are logged and retried on the next tick.
pub async fn monitor_and_forward(
    gateway: &dyn Gateway,
    mut cursor: Cursor,
    channels: &[ChatRef],
    settings: MonitorSettings,
    progress: &dyn ProgressSink,
) -> MonitorReport {
    let deadline = Instant::now() + settings.deadline;
    let mut tally = ForwardTally::default();

    while Instant::now() < deadline {
        sleep(settings.cadence).await;

        let bound = cursor.watermark();
        let remaining = deadline.saturating_duration_since(Instant::now());
        let fetched = timeout(remaining, gateway.fetch_recent(cursor.chat(), settings.window)).await;
        let recent = match fetched {
            Ok(Ok(recent)) => recent,
            Err(_) => {
                warn!(chat = %cursor.chat(), "Uploader history fetch still pending at the deadline");
                break;
            }
            Ok(Err(e)) => {
                warn!(error = %e, chat = %cursor.chat(), "Failed to fetch uploader output");
                continue;
            }
        };

        let mut fresh: Vec<Message> = recent.into_iter().take_while(|m| m.id > bound).collect();
        fresh.reverse();

        for message in fresh {
            cursor.advance(message.id);
            if message.outgoing {
                continue;
            }

            if is_completion(message.body()) {
                info!(
                    videos = tally.videos,
                    pdfs = tally.pdfs,
                    "Uploader bot signalled completion"
                );
                progress.status("Bot signalled completion").await;
                return MonitorReport {
                    tally,
                    end: MonitorEnd::Completed,
                };
            }

            let Some(kind) = media_kind(&message) else {
                continue;
            };
            fan_out(gateway, cursor.chat(), message.id, channels, settings.pacing).await;
            let line = match kind {
                MediaKind::Video => {
                    tally.videos += 1;
                    format!("Video #{} forwarded", tally.videos)
                }
                MediaKind::Pdf => {
                    tally.pdfs += 1;
                    format!("PDF #{} forwarded", tally.pdfs)
                }
            };
            progress.status(&line).await;
            progress.tally(tally).await;
        }
    }

    info!(videos = tally.videos, pdfs = tally.pdfs, "Monitor deadline reached");
    progress
        .status(&format!(
            "Max time reached. Forwarded: {} videos, {} PDFs",
            tally.videos, tally.pdfs
        ))
        .await;
    MonitorReport {
        tally,
        end: MonitorEnd::DeadlineReached,
    }
}
