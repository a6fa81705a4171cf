//! Per-user configuration row (`user_settings` table).

use chrono::{DateTime, Utc};
use relay_core::UserProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettingsRecord {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub token: Option<String>,
    pub extractor_bot: String,
    pub uploader_bot: String,
    #[sqlx(rename = "uploader_cmd")]
    pub uploader_command: Option<String>,
    #[sqlx(rename = "credit_name")]
    pub credit: Option<String>,
    pub is_subscribed: bool,
    pub sub_expiry: Option<DateTime<Utc>>,
    pub is_sudo: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettingsRecord {
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            token: self.token.clone(),
            extractor_bot: self.extractor_bot.clone(),
            uploader_bot: self.uploader_bot.clone(),
            uploader_command: self.uploader_command.clone(),
            credit: self.credit.clone(),
        }
    }

    /// True when subscribed and the expiry (if any) lies after `now`.
    pub fn subscription_active(&self, now: DateTime<Utc>) -> bool {
        self.is_subscribed && self.sub_expiry.map_or(true, |expiry| expiry > now)
    }
}

/// A piece of setup a user still has to complete before starting an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupItem {
    Token,
    UploaderCommand,
    Credit,
    Batch,
    Channel,
}

impl SetupItem {
    /// Human-readable hint naming the command that fixes it.
    pub fn hint(&self) -> &'static str {
        match self {
            SetupItem::Token => "PW Token → /SetToken",
            SetupItem::UploaderCommand => "Uploader Command → /SetupCommand",
            SetupItem::Credit => "Credit Name → /SetupCredit",
            SetupItem::Batch => "At least one Batch → /AddBatch",
            SetupItem::Channel => "At least one Channel → /AddChannel",
        }
    }
}
