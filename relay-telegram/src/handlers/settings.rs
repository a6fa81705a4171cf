//! Per-user settings: credentials, target bots, course list and destination channels.
//!
//! Every setter takes its value inline (`/SetToken eyJ...`) or, when sent bare, prompts and
//! consumes the user's next message.

use super::{numbered, parse_choice};
use crate::commands::known_command;
use crate::conversation::{Conversations, Pending};
use async_trait::async_trait;
use relay_core::{Handler, HandlerResponse, InboundMessage, Result, UserId};
use std::sync::Arc;
use storage::{SettingField, SettingsRepository, DEFAULT_EXTRACTOR_BOT, DEFAULT_UPLOADER_BOT};

pub const MIN_TOKEN_LEN: usize = 20;
pub const MIN_BATCH_LEN: usize = 3;

/// `-100…` numeric ids or `@public_name`.
pub fn is_valid_channel_id(id: &str) -> bool {
    if let Some(digits) = id.strip_prefix("-100") {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    }
    if let Some(name) = id.strip_prefix('@') {
        return !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    }
    false
}

fn prompt_for(pending: &Pending) -> &'static str {
    match pending {
        Pending::Token => "🔑 Set PW Token\n\nSend your access token (a long string starting with eyJ...).",
        Pending::ExtractorBot => "🤖 Set Extractor Bot\n\nSend the bot username.\nDefault: @pwextract_bot\n\nSend /skip to keep the default.",
        Pending::UploaderBot => "📤 Set Uploader Bot\n\nSend the bot username.\nDefault: @Mahira_uploder_24bot\n\nSend /skip to keep the default.",
        Pending::UploaderCommand => "🔐 Set Uploader Secret Command\n\nSend the command (must start with /).\nExample: /Mahi",
        Pending::Credit => "✍️ Set Credit Name\n\nSend the watermark name.\nExample: @YourChannel",
        Pending::AddBatch => "📝 Send the full batch name, exactly as the extractor lists it.",
        Pending::AddChannel => "📢 Send the channel ID, optionally followed by a name.\n\nFormat: -1001234567890 Main\n\nThe userbot account must be admin in the channel!",
        Pending::DelBatch | Pending::DelChannel => "Send the number or the exact value to remove.",
        Pending::SelectBatch | Pending::SelectChannel { .. } => "",
    }
}

pub struct SettingsHandler {
    settings: Arc<SettingsRepository>,
    conversations: Conversations,
}

impl SettingsHandler {
    pub fn new(settings: Arc<SettingsRepository>, conversations: Conversations) -> Self {
        Self {
            settings,
            conversations,
        }
    }

    /// Applies `value` to the setting `pending` stands for. A validation failure keeps the
    /// prompt open so the user can try again.
    async fn apply(&self, user_id: UserId, pending: &Pending, value: &str) -> Result<String> {
        let value = value.trim();
        let reply = match pending {
            Pending::Token => {
                if value.chars().count() < MIN_TOKEN_LEN {
                    return Ok("❌ Too short. Send a valid access token.".to_string());
                }
                self.settings
                    .set_field(user_id, SettingField::Token, value)
                    .await?;
                "✅ Token saved!".to_string()
            }
            Pending::ExtractorBot => {
                let bot = if value == "/skip" { DEFAULT_EXTRACTOR_BOT } else { value };
                self.settings
                    .set_field(user_id, SettingField::ExtractorBot, bot)
                    .await?;
                format!("✅ Extractor set: {}", bot)
            }
            Pending::UploaderBot => {
                let bot = if value == "/skip" { DEFAULT_UPLOADER_BOT } else { value };
                self.settings
                    .set_field(user_id, SettingField::UploaderBot, bot)
                    .await?;
                format!("✅ Uploader set: {}", bot)
            }
            Pending::UploaderCommand => {
                if !value.starts_with('/') || value.len() < 2 {
                    return Ok("❌ Must start with /".to_string());
                }
                self.settings
                    .set_field(user_id, SettingField::UploaderCommand, value)
                    .await?;
                format!("✅ Command set: {}", value)
            }
            Pending::Credit => {
                if value.is_empty() {
                    return Ok("❌ Credit name cannot be empty.".to_string());
                }
                self.settings
                    .set_field(user_id, SettingField::Credit, value)
                    .await?;
                format!("✅ Credit set: {}", value)
            }
            Pending::AddBatch => {
                if value.chars().count() < MIN_BATCH_LEN {
                    return Ok("❌ Batch name too short.".to_string());
                }
                if self.settings.add_batch(user_id, value).await? {
                    format!("✅ Batch added: {}\n\n{}", value, self.batch_list(user_id).await?)
                } else {
                    format!("ℹ️ Already saved: {}", value)
                }
            }
            Pending::DelBatch => {
                let batches = self.settings.batches(user_id).await?;
                let name = match parse_choice(value, batches.len()) {
                    Some(i) => batches[i].clone(),
                    None => value.to_string(),
                };
                if !self.settings.remove_batch(user_id, &name).await? {
                    return Ok(format!("❌ No saved batch matches: {}", value));
                }
                format!("✅ Removed: {}", name)
            }
            Pending::AddChannel => {
                let (id, name) = match value.split_once(char::is_whitespace) {
                    Some((id, name)) => (id, name.trim()),
                    None => (value, ""),
                };
                if !is_valid_channel_id(id) {
                    return Ok("❌ Send a channel ID like -1001234567890 or @channel_name.".to_string());
                }
                if self.settings.add_channel(user_id, id, name).await? {
                    format!("✅ Channel added: {}\n\n{}", id, self.channel_list(user_id).await?)
                } else {
                    format!("ℹ️ Already saved: {}", id)
                }
            }
            Pending::DelChannel => {
                let channels = self.settings.channels(user_id).await?;
                let id = match parse_choice(value, channels.len()) {
                    Some(i) => channels[i].channel_id.clone(),
                    None => value.to_string(),
                };
                if !self.settings.remove_channel(user_id, &id).await? {
                    return Ok(format!("❌ No saved channel matches: {}", value));
                }
                format!("✅ Removed: {}", id)
            }
            Pending::SelectBatch | Pending::SelectChannel { .. } => return Ok(String::new()),
        };
        self.conversations.clear(user_id);
        Ok(reply)
    }

    async fn batch_list(&self, user_id: UserId) -> Result<String> {
        let batches = self.settings.batches(user_id).await?;
        if batches.is_empty() {
            return Ok("📚 Your Batches\n\nNone saved yet. Add one with /AddBatch".to_string());
        }
        Ok(format!("📚 Your Batches\n\n{}", numbered(&batches)))
    }

    async fn channel_list(&self, user_id: UserId) -> Result<String> {
        let channels = self.settings.channels(user_id).await?;
        if channels.is_empty() {
            return Ok("📢 Your Channels\n\nNone saved yet. Add one with /AddChannel".to_string());
        }
        let labels: Vec<String> = channels
            .iter()
            .map(|c| format!("{} ({})", c.label(), c.channel_id))
            .collect();
        Ok(format!("📢 Your Channels\n\n{}", numbered(&labels)))
    }

    /// A setter command: apply an inline value or open the prompt.
    async fn setter(&self, user_id: UserId, pending: Pending, args: &str) -> Result<String> {
        if !args.is_empty() {
            return self.apply(user_id, &pending, args).await;
        }
        let mut prompt = prompt_for(&pending).to_string();
        match pending {
            Pending::DelBatch => {
                let list = self.batch_list(user_id).await?;
                prompt = format!("{}\n\n{}", list, prompt);
            }
            Pending::DelChannel => {
                let list = self.channel_list(user_id).await?;
                prompt = format!("{}\n\n{}", list, prompt);
            }
            _ => {}
        }
        self.conversations.set(user_id, pending);
        Ok(prompt)
    }
}

#[async_trait]
impl Handler for SettingsHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let user_id = message.user_id;

        if let Some(cmd) = known_command(&message.text) {
            let pending = match cmd.name.as_str() {
                "settoken" => Pending::Token,
                "setextractor" => Pending::ExtractorBot,
                "setuploader" => Pending::UploaderBot,
                "setupcommand" => Pending::UploaderCommand,
                "setupcredit" => Pending::Credit,
                "addbatch" => Pending::AddBatch,
                "delbatch" => Pending::DelBatch,
                "addchannel" => Pending::AddChannel,
                "delchannel" => Pending::DelChannel,
                "batches" => return Ok(HandlerResponse::Reply(self.batch_list(user_id).await?)),
                "channels" => return Ok(HandlerResponse::Reply(self.channel_list(user_id).await?)),
                "cancel" => return Ok(HandlerResponse::Reply("✅ Cancelled.".to_string())),
                _ => return Ok(HandlerResponse::Continue),
            };
            let reply = self.setter(user_id, pending, cmd.args).await?;
            return Ok(HandlerResponse::Reply(reply));
        }

        // Anything else, including unknown slash text such as "/Mahi" or "/skip", may answer
        // an open prompt.
        let Some(pending) = self.conversations.get(user_id) else {
            return Ok(HandlerResponse::Continue);
        };
        if matches!(pending, Pending::SelectBatch | Pending::SelectChannel { .. }) {
            return Ok(HandlerResponse::Continue);
        }
        let reply = self.apply(user_id, &pending, &message.text).await?;
        Ok(HandlerResponse::Reply(reply))
    }
}
