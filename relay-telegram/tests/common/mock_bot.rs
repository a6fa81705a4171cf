//! Mock implementation of [`relay_core::Bot`] for integration tests.
//!
//! Records sent messages and forwards every `edit_message` call to a channel so tests can wait
//! for the final status edit.

use async_trait::async_trait;
use relay_core::{Bot, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// One recorded call to `edit_message(chat_id, message_id, text)`.
#[derive(Debug, Clone)]
pub struct EditRecord {
    pub chat_id: i64,
    pub message_id: String,
    pub text: String,
}

pub struct MockBot {
    placeholder_id: String,
    sent: Mutex<Vec<(i64, String)>>,
    edit_tx: mpsc::UnboundedSender<EditRecord>,
}

impl MockBot {
    /// Creates a MockBot and returns the receiver for edit records.
    /// `send_message_and_return_id` always answers `"1"`.
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<EditRecord>) {
        let (edit_tx, edit_rx) = mpsc::unbounded_channel();
        let bot = Arc::new(Self {
            placeholder_id: "1".to_string(),
            sent: Mutex::new(Vec::new()),
            edit_tx,
        });
        (bot, edit_rx)
    }

    /// Texts sent to `chat_id`, in order.
    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat_id: i64, text: &str) -> Result<String> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(self.placeholder_id.clone())
    }

    async fn edit_message(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()> {
        let _ = self.edit_tx.send(EditRecord {
            chat_id,
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}
