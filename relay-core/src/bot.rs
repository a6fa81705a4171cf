//! Operator-facing bot abstraction for sending and editing messages.
//!
//! [`Bot`] is transport-agnostic; `relay-telegram` implements it via teloxide.

use crate::error::{HandlerError, RelayError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
    /// Sends a message and returns its id, for later `edit_message` calls.
    async fn send_message_and_return_id(&self, chat_id: i64, text: &str) -> Result<String>;
    /// Edits an already-sent message. `message_id` is transport-specific (Telegram numeric string).
    async fn edit_message(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()>;
}

/// Parses a message id string into an i32. Used by edit_message.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse().map_err(|_| {
        RelayError::Handler(HandlerError::State(format!(
            "Invalid message_id for edit: {}",
            s
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_id_valid() {
        assert_eq!(parse_message_id("123").unwrap(), 123);
        assert_eq!(parse_message_id("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_message_id_invalid() {
        assert!(parse_message_id("").is_err());
        assert!(parse_message_id("abc").is_err());
        assert!(parse_message_id("12.3").is_err());
    }
}
