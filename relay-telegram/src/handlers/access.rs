use crate::access::{Access, AccessPolicy};
use crate::commands::{Command, KNOWN_COMMANDS, OPEN_COMMANDS};
use crate::conversation::Conversations;
use async_trait::async_trait;
use relay_core::{Handler, InboundMessage, Result};
use std::sync::Arc;
use storage::SettingsRepository;
use tracing::info;

/// Records the sender, then refuses banned users and users without access.
///
/// `/start`, `/help` and `/me` stay available to everyone who is not banned. A known command
/// abandons whatever prompt the user had open.
pub struct AccessGate {
    settings: Arc<SettingsRepository>,
    policy: AccessPolicy,
    conversations: Conversations,
}

impl AccessGate {
    pub fn new(
        settings: Arc<SettingsRepository>,
        policy: AccessPolicy,
        conversations: Conversations,
    ) -> Self {
        Self {
            settings,
            policy,
            conversations,
        }
    }
}

#[async_trait]
impl Handler for AccessGate {
    async fn before(&self, message: &InboundMessage) -> Result<Option<String>> {
        self.settings
            .upsert_user(
                message.user_id,
                message.username.as_deref(),
                message.first_name.as_deref(),
            )
            .await?;

        let command = Command::parse(&message.text);
        if let Some(cmd) = &command {
            if KNOWN_COMMANDS.contains(&cmd.name.as_str()) {
                self.conversations.clear(message.user_id);
            }
        }

        let access = self.policy.access(message.user_id).await?;
        if access == Access::Banned {
            info!(user_id = message.user_id, "Banned user refused");
            self.conversations.clear(message.user_id);
            return Ok(Some("🚫 You are banned from this bot.".to_string()));
        }
        if command
            .as_ref()
            .is_some_and(|c| OPEN_COMMANDS.contains(&c.name.as_str()))
        {
            return Ok(None);
        }
        if access.is_granted() {
            return Ok(None);
        }

        self.conversations.clear(message.user_id);
        match command {
            Some(_) => Ok(Some("❌ No access. Contact admin.".to_string())),
            // Plain text from users without access is ignored.
            None => Ok(Some(String::new())),
        }
    }
}
