//! Wait-for-reply engine: polls a chat until a message satisfies a classifier or time runs out.

use crate::classifier::Classifier;
use relay_core::{ChatRef, Gateway, Message, RelayError, Result};
use std::time::Duration;
use tokio::time::{self, sleep, Instant};
use tracing::{debug, warn};

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const POLL_WINDOW: usize = 8;
/// Bound on reading a chat's newest message id when positioning a cursor.
pub const LATEST_ID_TIMEOUT: Duration = Duration::from_secs(30);

async fn bounded_latest_id<G: Gateway + ?Sized>(gateway: &G, chat: &ChatRef) -> Result<i64> {
    time::timeout(LATEST_ID_TIMEOUT, gateway.latest_id(chat))
        .await
        .map_err(|_| RelayError::Gateway(format!("reading latest message of {} timed out", chat)))?
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Newest messages fetched per poll.
    pub window: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            window: POLL_WINDOW,
        }
    }
}

/// Position in one chat: the highest message id already inspected. Never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    chat: ChatRef,
    watermark: i64,
}

impl Cursor {
    pub fn new(chat: ChatRef, watermark: i64) -> Self {
        Self { chat, watermark }
    }

    /// Cursor positioned at the newest message currently in the chat.
    pub async fn at_latest<G: Gateway + ?Sized>(gateway: &G, chat: ChatRef) -> Result<Self> {
        let watermark = bounded_latest_id(gateway, &chat).await?;
        Ok(Self::new(chat, watermark))
    }

    pub fn chat(&self) -> &ChatRef {
        &self.chat
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub fn advance(&mut self, id: i64) {
        self.watermark = self.watermark.max(id);
    }

    /// Moves the watermark up to the newest message in the chat.
    pub async fn mark_latest<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<()> {
        let latest = bounded_latest_id(gateway, &self.chat).await?;
        self.advance(latest);
        Ok(())
    }
}

/// Polls `cursor`'s chat every `settings.interval` until `classifier` accepts a new message.
///
/// Each poll inspects the fetched window newest-first and stops at the watermark the poll started
/// with. Every inspected id is folded into the watermark whether or not it matched, and the first
/// accepted message (the newest) is returned. `Ok(None)` means the timeout elapsed.
pub async fn wait_for_reply<G: Gateway + ?Sized>(
    gateway: &G,
    cursor: &mut Cursor,
    classifier: &Classifier,
    timeout: Duration,
    settings: PollSettings,
) -> Result<Option<Message>> {
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        sleep(settings.interval).await;

        let bound = cursor.watermark;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let Ok(fetched) =
            time::timeout(remaining, gateway.fetch_recent(&cursor.chat, settings.window)).await
        else {
            warn!(chat = %cursor.chat, "History fetch still pending at the wait deadline");
            break;
        };
        let recent = fetched?;
        for message in recent {
            if message.id <= bound {
                break;
            }
            cursor.advance(message.id);
            if classifier.accepts(&message) {
                debug!(
                    chat = %cursor.chat,
                    message_id = message.id,
                    classifier = classifier.name(),
                    "Reply matched"
                );
                return Ok(Some(message));
            }
        }
    }

    debug!(
        chat = %cursor.chat,
        classifier = classifier.name(),
        timeout_secs = timeout.as_secs(),
        "No matching reply before timeout"
    );
    Ok(None)
}
