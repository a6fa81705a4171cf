//! Adapters from Telegram (teloxide) types to relay_core types.

use relay_core::{InboundMessage, ToInbound};

/// Wraps a teloxide Message for conversion to [`InboundMessage`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToInbound for TelegramMessageWrapper<'a> {
    fn to_inbound(&self) -> InboundMessage {
        let from = self.0.from.as_ref();
        InboundMessage {
            id: self.0.id.to_string(),
            user_id: from.map(|u| u.id.0 as i64).unwrap_or(0),
            username: from.and_then(|u| u.username.clone()),
            first_name: from.map(|u| u.first_name.clone()),
            chat_id: self.0.chat.id.0,
            text: self.0.text().unwrap_or("").trim().to_string(),
            created_at: self.0.date,
        }
    }
}
