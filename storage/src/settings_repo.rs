//! Settings repository: per-user configuration, course list, destination channels and access flags.
//!
//! Uses SqlitePoolManager and the models (UserSettingsRecord, ChannelRecord, SetupItem).
//! Also implements [`ProfileStore`] for the job coordinator.

use crate::error::StorageError;
use crate::models::{ChannelRecord, SetupItem, UserSettingsRecord};
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use relay_core::{ProfileStore, UserId, UserProfile};
use tracing::info;

pub const DEFAULT_EXTRACTOR_BOT: &str = "@pwextract_bot";
pub const DEFAULT_UPLOADER_BOT: &str = "@Mahira_uploder_24bot";

/// A single-column setting a user can change with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Token,
    ExtractorBot,
    UploaderBot,
    UploaderCommand,
    Credit,
}

impl SettingField {
    fn column(&self) -> &'static str {
        match self {
            SettingField::Token => "token",
            SettingField::ExtractorBot => "extractor_bot",
            SettingField::UploaderBot => "uploader_bot",
            SettingField::UploaderCommand => "uploader_cmd",
            SettingField::Credit => "credit_name",
        }
    }
}

#[derive(Clone)]
pub struct SettingsRepository {
    pool_manager: SqlitePoolManager,
}

impl SettingsRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Ok(Self { pool_manager })
    }

    pub fn from_pool(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Inserts the user or refreshes their names. Existing names survive a `None`.
    pub async fn upsert_user(
        &self,
        user_id: UserId,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, username, first_name, extractor_bot, uploader_bot, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = COALESCE(excluded.username, user_settings.username),
                first_name = COALESCE(excluded.first_name, user_settings.first_name),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(first_name)
        .bind(DEFAULT_EXTRACTOR_BOT)
        .bind(DEFAULT_UPLOADER_BOT)
        .bind(now)
        .bind(now)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<UserSettingsRecord>, StorageError> {
        let record = sqlx::query_as::<_, UserSettingsRecord>(
            "SELECT * FROM user_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    async fn get_user_required(&self, user_id: UserId) -> Result<UserSettingsRecord, StorageError> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {}", user_id)))
    }

    pub async fn set_field(
        &self,
        user_id: UserId,
        field: SettingField,
        value: &str,
    ) -> Result<(), StorageError> {
        let sql = format!(
            "UPDATE user_settings SET {} = ?, updated_at = ? WHERE user_id = ?",
            field.column()
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("user {}", user_id)));
        }
        info!(user_id = user_id, field = field.column(), "Setting updated");
        Ok(())
    }

    /// Grants (`days` from now) or revokes a subscription.
    pub async fn set_subscribed(
        &self,
        user_id: UserId,
        subscribed: bool,
        days: i64,
    ) -> Result<(), StorageError> {
        let expiry = subscribed.then(|| Utc::now() + Duration::days(days));
        sqlx::query(
            "UPDATE user_settings SET is_subscribed = ?, sub_expiry = ?, updated_at = ? WHERE user_id = ?",
        )
        .bind(subscribed)
        .bind(expiry)
        .bind(Utc::now())
        .bind(user_id)
        .execute(self.pool_manager.pool())
        .await?;
        info!(user_id = user_id, subscribed = subscribed, days = days, "Subscription changed");
        Ok(())
    }

    pub async fn set_banned(&self, user_id: UserId, banned: bool) -> Result<(), StorageError> {
        sqlx::query("UPDATE user_settings SET is_banned = ?, updated_at = ? WHERE user_id = ?")
            .bind(banned)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool_manager.pool())
            .await?;
        info!(user_id = user_id, banned = banned, "Ban flag changed");
        Ok(())
    }

    /// Checks the subscription and clears the flag once its expiry has passed.
    pub async fn check_subscription(&self, user_id: UserId) -> Result<bool, StorageError> {
        let Some(user) = self.get_user(user_id).await? else {
            return Ok(false);
        };
        if user.subscription_active(Utc::now()) {
            return Ok(true);
        }
        if user.is_subscribed {
            info!(user_id = user_id, "Subscription expired");
            self.set_subscribed(user_id, false, 0).await?;
        }
        Ok(false)
    }

    /// Adds a course name; returns false when it was already present.
    pub async fn add_batch(&self, user_id: UserId, name: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_batches (user_id, batch_name, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(name)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_batch(&self, user_id: UserId, name: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM user_batches WHERE user_id = ? AND batch_name = ?")
            .bind(user_id)
            .bind(name)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Course names in insertion order.
    pub async fn batches(&self, user_id: UserId) -> Result<Vec<String>, StorageError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT batch_name FROM user_batches WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(names)
    }

    /// Adds a destination channel; returns false when it was already present.
    pub async fn add_channel(
        &self,
        user_id: UserId,
        channel_id: &str,
        channel_name: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_channels (user_id, channel_id, channel_name, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(channel_id)
        .bind(channel_name)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_channel(&self, user_id: UserId, channel_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM user_channels WHERE user_id = ? AND channel_id = ?")
            .bind(user_id)
            .bind(channel_id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Destination channels in insertion order.
    pub async fn channels(&self, user_id: UserId) -> Result<Vec<ChannelRecord>, StorageError> {
        let channels = sqlx::query_as::<_, ChannelRecord>(
            "SELECT channel_id, channel_name FROM user_channels WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(channels)
    }

    /// What the user still has to configure before an extraction can start.
    pub async fn missing_setup(&self, user_id: UserId) -> Result<Vec<SetupItem>, StorageError> {
        let user = self.get_user_required(user_id).await?;
        let mut missing = Vec::new();
        if user.token.as_deref().map_or(true, str::is_empty) {
            missing.push(SetupItem::Token);
        }
        if user.uploader_command.as_deref().map_or(true, str::is_empty) {
            missing.push(SetupItem::UploaderCommand);
        }
        if user.credit.as_deref().map_or(true, str::is_empty) {
            missing.push(SetupItem::Credit);
        }
        if self.batches(user_id).await?.is_empty() {
            missing.push(SetupItem::Batch);
        }
        if self.channels(user_id).await?.is_empty() {
            missing.push(SetupItem::Channel);
        }
        Ok(missing)
    }

    /// Ids of every user that is not banned (broadcast audience).
    pub async fn active_user_ids(&self) -> Result<Vec<UserId>, StorageError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM user_settings WHERE is_banned = 0 ORDER BY user_id",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(ids)
    }
}

#[async_trait]
impl ProfileStore for SettingsRepository {
    async fn profile(&self, user_id: UserId) -> relay_core::Result<Option<UserProfile>> {
        let user = self.get_user(user_id).await?;
        Ok(user.map(|u| u.to_profile()))
    }
}
