use async_trait::async_trait;
use relay_core::{Handler, InboundMessage, Result};
use tracing::info;

/// Logs every inbound message before the rest of the chain sees it.
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    async fn before(&self, message: &InboundMessage) -> Result<Option<String>> {
        info!(
            user_id = message.user_id,
            username = ?message.username,
            chat_id = message.chat_id,
            message_content = %message.text,
            "Received message"
        );
        Ok(None)
    }
}
