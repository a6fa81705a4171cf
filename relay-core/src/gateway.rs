//! Messaging gateway: the single shared identity that talks to external bots.
//!
//! [`Gateway`] is transport-agnostic. The drivers only ever see this trait, so tests can
//! replay scripted conversations without a network.

use crate::error::Result;
use crate::types::{ChatRef, Message};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Sends a text message to the chat.
    async fn send(&self, chat: &ChatRef, text: &str) -> Result<()>;

    /// Uploads a local file to the chat as a document.
    async fn send_document(&self, chat: &ChatRef, path: &Path) -> Result<()>;

    /// Fetches up to `limit` most recent messages of the chat, newest first.
    async fn fetch_recent(&self, chat: &ChatRef, limit: usize) -> Result<Vec<Message>>;

    /// Downloads the attachment of `message` to `destination`; returns the stored path.
    async fn download(&self, chat: &ChatRef, message: &Message, destination: &Path)
        -> Result<PathBuf>;

    /// Presses the inline button of `message` whose label contains `label`
    /// (case-insensitive). Returns false when no such button could be pressed.
    async fn invoke_action(&self, chat: &ChatRef, message: &Message, label: &str) -> Result<bool>;

    /// Copies a message into another chat without forwarding attribution.
    async fn copy(&self, source: &ChatRef, message_id: i64, destination: &ChatRef) -> Result<()>;

    /// Id of the newest message in the chat, 0 when the chat is empty.
    async fn latest_id(&self, chat: &ChatRef) -> Result<i64> {
        Ok(self
            .fetch_recent(chat, 1)
            .await?
            .first()
            .map(|m| m.id)
            .unwrap_or(0))
    }
}
