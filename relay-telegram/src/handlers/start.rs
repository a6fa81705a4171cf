use crate::access::{Access, AccessPolicy};
use crate::commands::{known_command, Command};
use async_trait::async_trait;
use relay_core::{Handler, HandlerResponse, InboundMessage, Result, UserId};
use std::sync::Arc;
use storage::{ChannelRecord, SettingsRepository, UserSettingsRecord};

const HELP_TEXT: &str = "📖 Commands\n\
━━━━━━━━━━━━━━━━━━━\n\n\
⚙️ Setup (run first)\n\
/SetToken — PW access token\n\
/SetExtractor — Extractor bot\n\
/SetUploader — Uploader bot\n\
/SetupCommand — Uploader secret command\n\
/SetupCredit — Credit name\n\
/AddBatch, /DelBatch, /Batches — Courses\n\
/AddChannel, /DelChannel, /Channels — Destination channels\n\
/cancel — Abandon the current prompt\n\n\
🚀 Main\n\
/StartExtraction — Begin workflow\n\
/status — Your settings\n\
/me — Subscription info\n\n\
👑 Admin Only\n\
/adduser <id> [days]\n\
/removeuser <id>\n\
/banuser <id> / /unbanuser <id>\n\
/stats — Bot stats\n\
/broadcast <text>";

/// Shows a long token as its first 15 and last 8 characters.
pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 23 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..15].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check(set: bool) -> &'static str {
    if set {
        "✅"
    } else {
        "❌"
    }
}

fn or_not_set(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("Not set")
}

pub(crate) fn render_status(
    user: Option<&UserSettingsRecord>,
    batches: &[String],
    channels: &[ChannelRecord],
    missing: &[&'static str],
) -> String {
    let token = user.and_then(|u| u.token.as_deref()).filter(|t| !t.is_empty());
    let extractor = user.map(|u| u.extractor_bot.as_str());
    let uploader = user.map(|u| u.uploader_bot.as_str());
    let command = user.and_then(|u| u.uploader_command.as_deref());
    let credit = user.and_then(|u| u.credit.as_deref());

    let mut text = format!(
        "📊 Your Settings\n━━━━━━━━━━━━━━━━━━━\n\n\
         {} Token: {}\n{} Extractor: {}\n{} Uploader: {}\n{} Command: {}\n{} Credit: {}\n\n\
         📚 Batches ({}):\n",
        check(token.is_some()),
        token.map(mask_token).unwrap_or_else(|| "Not set".to_string()),
        check(extractor.is_some()),
        or_not_set(extractor),
        check(uploader.is_some()),
        or_not_set(uploader),
        check(command.is_some_and(|c| !c.is_empty())),
        or_not_set(command),
        check(credit.is_some_and(|c| !c.is_empty())),
        or_not_set(credit),
        batches.len()
    );
    if batches.is_empty() {
        text.push_str("  None\n");
    }
    for (i, batch) in batches.iter().enumerate() {
        text.push_str(&format!("  {}. {}\n", i + 1, batch));
    }
    text.push_str(&format!("\n📢 Channels ({}):\n", channels.len()));
    if channels.is_empty() {
        text.push_str("  None\n");
    }
    for channel in channels {
        text.push_str(&format!("  • {} ({})\n", channel.label(), channel.channel_id));
    }
    if missing.is_empty() {
        text.push_str("\n✅ Ready! Use /StartExtraction");
    } else {
        text.push_str("\n⚠️ Missing:\n");
        for item in missing {
            text.push_str(&format!("  • {}\n", item));
        }
    }
    text
}

/// `/start`, `/help`, `/status`, `/me`.
pub struct StartHandler {
    settings: Arc<SettingsRepository>,
    policy: AccessPolicy,
}

impl StartHandler {
    pub fn new(settings: Arc<SettingsRepository>, policy: AccessPolicy) -> Self {
        Self { settings, policy }
    }

    async fn start(&self, message: &InboundMessage) -> Result<String> {
        let name = message.first_name.as_deref().unwrap_or("User");
        let access = self.policy.access(message.user_id).await?;
        if access.is_granted() {
            Ok(format!(
                "👋 Welcome, {}!\n\n🤖 Course Relay Bot\n━━━━━━━━━━━━━━━━━━━\n\n\
                 Automates full course extraction:\n📥 Extract → ⬇️ Download → 📢 Forward\n\n\
                 Set everything up first (/status shows what is missing), then use /StartExtraction.",
                name
            ))
        } else {
            Ok(format!(
                "👋 Hello, {}!\n\n⚠️ You need a subscription to use this bot.\n\n\
                 Contact an admin with your ID: {}",
                name, message.user_id
            ))
        }
    }

    async fn status(&self, user_id: UserId) -> Result<String> {
        let user = self.settings.get_user(user_id).await?;
        let batches = self.settings.batches(user_id).await?;
        let channels = self.settings.channels(user_id).await?;
        let missing: Vec<&'static str> = self
            .settings
            .missing_setup(user_id)
            .await?
            .iter()
            .map(|m| m.hint())
            .collect();
        Ok(render_status(user.as_ref(), &batches, &channels, &missing))
    }

    async fn me(&self, message: &InboundMessage) -> Result<String> {
        let user = self.settings.get_user(message.user_id).await?;
        let role = match self.policy.access(message.user_id).await? {
            Access::Granted { sudo: true } => "👑 Sudo",
            Access::Granted { sudo: false } => "✅ Subscribed",
            Access::Denied => "❌ Not Subscribed",
            Access::Banned => "🚫 Banned",
        };
        let expiry = user
            .as_ref()
            .and_then(|u| u.sub_expiry)
            .map(|e| e.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "—".to_string());
        Ok(format!(
            "👤 Account Info\n━━━━━━━━━━━━━━━━━━━\n\n\
             🆔 ID: {}\n👤 Name: {}\n📛 Username: @{}\n🎫 Status: {}\n📅 Expires: {}",
            message.user_id,
            message.first_name.as_deref().unwrap_or("N/A"),
            message.username.as_deref().unwrap_or("N/A"),
            role,
            expiry
        ))
    }
}

#[async_trait]
impl Handler for StartHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let Some(cmd) = Command::parse(&message.text) else {
            return Ok(HandlerResponse::Continue);
        };
        let reply = match cmd.name.as_str() {
            "start" => self.start(message).await?,
            "help" => HELP_TEXT.to_string(),
            "status" => self.status(message.user_id).await?,
            "me" => self.me(message).await?,
            _ => return Ok(HandlerResponse::Continue),
        };
        Ok(HandlerResponse::Reply(reply))
    }
}

/// Last in the chain: a slash command that nothing consumed.
pub struct UnknownCommandHandler;

#[async_trait]
impl Handler for UnknownCommandHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        if Command::parse(&message.text).is_some() && known_command(&message.text).is_none() {
            return Ok(HandlerResponse::Reply(
                "❓ Unknown command. See /help".to_string(),
            ));
        }
        Ok(HandlerResponse::Continue)
    }
}
