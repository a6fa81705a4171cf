//! Application config loaded from environment variables.
//!
//! Call `dotenvy::dotenv()` before [`AppConfig::load`] so `.env` values are visible.

use anyhow::{Context, Result};
use relay_core::UserId;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    pub database_url: String,
    pub log_file: String,
    /// Base URL of the userbot bridge (GATEWAY_URL)
    pub gateway_url: String,
    pub gateway_token: Option<String>,
    /// Operators with admin rights regardless of the database flag (SUDO_USERS, comma-separated)
    pub sudo_users: Vec<UserId>,
    /// Where downloaded course indexes are kept until uploaded
    pub download_dir: PathBuf,
}

impl AppConfig {
    /// Loads from the environment. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://relay.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/relay.log".to_string());
        let gateway_url = env::var("GATEWAY_URL").context("GATEWAY_URL not set")?;
        let gateway_token = env::var("GATEWAY_TOKEN").ok().filter(|t| !t.is_empty());
        let sudo_users = parse_sudo_users(&env::var("SUDO_USERS").unwrap_or_default())?;
        let download_dir = env::var("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"));

        Ok(Self {
            bot_token,
            telegram_api_url,
            database_url,
            log_file,
            gateway_url,
            gateway_token,
            sudo_users,
            download_dir,
        })
    }

    /// Both URLs must parse; call before building components.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if reqwest::Url::parse(&self.gateway_url).is_err() {
            anyhow::bail!("GATEWAY_URL is not a valid URL: {}", self.gateway_url);
        }
        Ok(())
    }
}

fn parse_sudo_users(raw: &str) -> Result<Vec<UserId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<UserId>()
                .with_context(|| format!("SUDO_USERS contains a non-numeric id: {}", s))
        })
        .collect()
}
