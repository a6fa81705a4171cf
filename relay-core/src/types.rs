//! Core types: chat references, gateway messages, user profiles, job bookkeeping,
//! inbound operator messages and the Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Telegram user id of an operator talking to the relay bot.
pub type UserId = i64;

/// Chat identity as the gateway understands it: `@username` or a numeric id such as `-100123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatRef(String);

impl ChatRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Attachment carried by a gateway message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Video,
    Document { file_name: Option<String> },
    Photo,
    Other,
}

/// A message in an external bot chat, as seen by the driver identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    /// True when the driver identity sent this message itself.
    #[serde(default)]
    pub outgoing: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Labels of inline buttons attached to the message.
    #[serde(default)]
    pub buttons: Vec<String>,
    #[serde(default)]
    pub media: Option<Media>,
}

impl Message {
    pub fn text(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            outgoing: false,
            text: Some(text.into()),
            caption: None,
            buttons: Vec::new(),
            media: None,
        }
    }

    pub fn with_media(id: i64, media: Media) -> Self {
        Self {
            id,
            outgoing: false,
            text: None,
            caption: None,
            buttons: Vec::new(),
            media: Some(media),
        }
    }

    /// Text if present, caption otherwise, empty string when neither is set.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }

    pub fn is_video(&self) -> bool {
        matches!(self.media, Some(Media::Video))
    }

    /// File name of a document attachment; `None` for other media or a nameless document.
    pub fn document_name(&self) -> Option<&str> {
        match &self.media {
            Some(Media::Document { file_name }) => file_name.as_deref(),
            _ => None,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self.media, Some(Media::Document { .. }))
    }
}

/// Everything the drivers need to know about an operator: credentials and target bots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub token: Option<String>,
    pub extractor_bot: String,
    pub uploader_bot: String,
    pub uploader_command: Option<String>,
    pub credit: Option<String>,
}

impl UserProfile {
    /// Names of the settings that must be filled in before a job can run.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.token.as_deref().map_or(true, str::is_empty) {
            missing.push("token");
        }
        if self.uploader_command.as_deref().map_or(true, str::is_empty) {
            missing.push("uploader command");
        }
        if self.credit.as_deref().map_or(true, str::is_empty) {
            missing.push("credit");
        }
        missing
    }
}

/// Lifecycle state of a persisted job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media forwarded so far by the monitor loop. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardTally {
    pub videos: u32,
    pub pdfs: u32,
}

/// An operator's message to the relay bot, transport-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub chat_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; nothing to send back.
    Stop,
    /// Stop the chain and send this text back to the operator.
    Reply(String),
}

/// Converts a transport-specific message type to [`InboundMessage`].
pub trait ToInbound: Send + Sync {
    fn to_inbound(&self) -> InboundMessage;
}

/// One stage of the command router. `before` may veto the message; `handle` may answer it.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before any handle phase. Return `Some(reply)` to stop the chain with that reply;
    /// an empty reply stops it silently.
    async fn before(&self, _message: &InboundMessage) -> crate::error::Result<Option<String>> {
        Ok(None)
    }

    /// Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &InboundMessage) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
}
