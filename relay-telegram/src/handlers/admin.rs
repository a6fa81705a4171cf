//! Sudo-only commands: subscriptions, bans, statistics and broadcast.

use crate::access::AccessPolicy;
use crate::commands::{known_command, Command};
use async_trait::async_trait;
use relay_core::{Bot, Handler, HandlerResponse, InboundMessage, Result, UserId};
use std::sync::Arc;
use std::time::Duration;
use storage::{BotStats, JobRepository, SettingsRepository};
use tracing::{info, warn};

pub const DEFAULT_SUBSCRIPTION_DAYS: i64 = 30;
const BROADCAST_PACING: Duration = Duration::from_millis(50);

pub(crate) fn render_stats(stats: &BotStats) -> String {
    format!(
        "📊 Bot Stats\n━━━━━━━━━━━━━━━━━━━\n\n\
         👥 Total Users: {}\n✅ Subscribed: {}\n\n\
         ⚙️ Total Jobs: {}\n✅ Completed: {}\n\n\
         🎬 Videos Fwd: {}\n📄 PDFs Fwd: {}",
        stats.users, stats.subscribed, stats.jobs, stats.done, stats.videos, stats.pdfs
    )
}

pub struct AdminHandler {
    settings: Arc<SettingsRepository>,
    jobs: Arc<JobRepository>,
    policy: AccessPolicy,
    bot: Arc<dyn Bot>,
}

impl AdminHandler {
    pub fn new(
        settings: Arc<SettingsRepository>,
        jobs: Arc<JobRepository>,
        policy: AccessPolicy,
        bot: Arc<dyn Bot>,
    ) -> Self {
        Self {
            settings,
            jobs,
            policy,
            bot,
        }
    }

    /// Best-effort notice to another user; they may never have started the bot.
    async fn notify(&self, user_id: UserId, text: &str) {
        if let Err(e) = self.bot.send_message(user_id, text).await {
            warn!(error = %e, user_id = user_id, "Could not notify user");
        }
    }

    async fn add_user(&self, cmd: &Command<'_>) -> Result<String> {
        let args = cmd.arg_list();
        let Some(raw_id) = args.first() else {
            return Ok(format!(
                "Usage: /adduser <user_id> [days]\nDefault days: {}",
                DEFAULT_SUBSCRIPTION_DAYS
            ));
        };
        let (Ok(target), Ok(days)) = (
            raw_id.parse::<UserId>(),
            args.get(1)
                .map_or(Ok(DEFAULT_SUBSCRIPTION_DAYS), |d| d.parse::<i64>()),
        ) else {
            return Ok("❌ Use numbers only.".to_string());
        };
        if days <= 0 {
            return Ok("❌ Days must be positive.".to_string());
        }

        if self.settings.get_user(target).await?.is_none() {
            let placeholder = format!("User_{}", target);
            self.settings
                .upsert_user(target, None, Some(&placeholder))
                .await?;
        }
        self.settings.set_subscribed(target, true, days).await?;
        info!(target = target, days = days, "Subscription granted");

        self.notify(
            target,
            &format!(
                "🎉 Access Granted!\n\nYou have {} days of access.\nUse /start to begin.",
                days
            ),
        )
        .await;
        Ok(format!("✅ Subscribed!\n🆔 {}\n📅 {} days", target, days))
    }

    async fn remove_user(&self, cmd: &Command<'_>) -> Result<String> {
        let Some(target) = parse_target(cmd) else {
            return Ok("Usage: /removeuser <user_id>".to_string());
        };
        self.settings.set_subscribed(target, false, 0).await?;
        self.notify(target, "⚠️ Your subscription has been removed.").await;
        Ok(format!("✅ Removed: {}", target))
    }

    async fn ban(&self, cmd: &Command<'_>, sender: UserId, banned: bool) -> Result<String> {
        let Some(target) = parse_target(cmd) else {
            let usage = if banned { "/banuser" } else { "/unbanuser" };
            return Ok(format!("Usage: {} <user_id>", usage));
        };
        if banned && target == sender {
            return Ok("❌ Can't ban yourself.".to_string());
        }
        self.settings.set_banned(target, banned).await?;
        if banned {
            Ok(format!("🔨 Banned: {}", target))
        } else {
            Ok(format!("✅ Unbanned: {}", target))
        }
    }

    async fn broadcast(&self, message: &InboundMessage, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok("Usage: /broadcast <message>".to_string());
        }
        let audience = self.settings.active_user_ids().await?;
        let status_id = self
            .bot
            .send_message_and_return_id(
                message.chat_id,
                &format!("📢 Broadcasting to {} users...", audience.len()),
            )
            .await?;

        let (mut sent, mut failed) = (0usize, 0usize);
        for user_id in audience {
            match self.bot.send_message(user_id, text).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(error = %e, user_id = user_id, "Broadcast delivery failed");
                    failed += 1;
                }
            }
            tokio::time::sleep(BROADCAST_PACING).await;
        }
        info!(sent = sent, failed = failed, "Broadcast finished");

        let summary = format!("📢 Broadcast Done\n✅ Sent: {}\n❌ Failed: {}", sent, failed);
        if let Err(e) = self
            .bot
            .edit_message(message.chat_id, &status_id, &summary)
            .await
        {
            warn!(error = %e, "Failed to edit broadcast status");
            return Ok(summary);
        }
        Ok(String::new())
    }
}

fn parse_target(cmd: &Command<'_>) -> Option<UserId> {
    cmd.arg_list().first()?.parse().ok()
}

#[async_trait]
impl Handler for AdminHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let Some(cmd) = known_command(&message.text) else {
            return Ok(HandlerResponse::Continue);
        };
        if !matches!(
            cmd.name.as_str(),
            "adduser" | "removeuser" | "banuser" | "unbanuser" | "stats" | "broadcast"
        ) {
            return Ok(HandlerResponse::Continue);
        }
        if !self.policy.is_sudo(message.user_id).await? {
            return Ok(HandlerResponse::Reply("❌ Sudo only.".to_string()));
        }

        let reply = match cmd.name.as_str() {
            "adduser" => self.add_user(&cmd).await?,
            "removeuser" => self.remove_user(&cmd).await?,
            "banuser" => self.ban(&cmd, message.user_id, true).await?,
            "unbanuser" => self.ban(&cmd, message.user_id, false).await?,
            "stats" => render_stats(&self.jobs.stats().await?),
            _ => self.broadcast(message, cmd.args).await?,
        };
        if reply.is_empty() {
            return Ok(HandlerResponse::Stop);
        }
        Ok(HandlerResponse::Reply(reply))
    }
}
