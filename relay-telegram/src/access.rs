//! Who may use the bot: banned users never, sudo users always, everyone else while subscribed.

use relay_core::{Result, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use storage::SettingsRepository;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Banned,
    /// Known but without an active subscription.
    Denied,
    Granted { sudo: bool },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted { .. })
    }
}

#[derive(Clone)]
pub struct AccessPolicy {
    settings: Arc<SettingsRepository>,
    sudo_users: Arc<HashSet<UserId>>,
}

impl AccessPolicy {
    pub fn new(settings: Arc<SettingsRepository>, sudo_users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            settings,
            sudo_users: Arc::new(sudo_users.into_iter().collect()),
        }
    }

    /// Sudo from config or from the stored flag.
    pub async fn is_sudo(&self, user_id: UserId) -> Result<bool> {
        if self.sudo_users.contains(&user_id) {
            return Ok(true);
        }
        let record = self.settings.get_user(user_id).await?;
        Ok(record.is_some_and(|r| r.is_sudo))
    }

    /// Expired subscriptions are cleared as a side effect.
    pub async fn access(&self, user_id: UserId) -> Result<Access> {
        let record = self.settings.get_user(user_id).await?;
        if record.as_ref().is_some_and(|r| r.is_banned) {
            return Ok(Access::Banned);
        }
        if self.sudo_users.contains(&user_id) || record.as_ref().is_some_and(|r| r.is_sudo) {
            return Ok(Access::Granted { sudo: true });
        }
        if record.is_none() {
            return Ok(Access::Denied);
        }
        let subscribed = self.settings.check_subscription(user_id).await?;
        if subscribed {
            Ok(Access::Granted { sudo: false })
        } else {
            info!(user_id = user_id, "Access denied: no active subscription");
            Ok(Access::Denied)
        }
    }
}
