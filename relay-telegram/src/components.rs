//! Builds the shared components and the handler chain from [`AppConfig`].

use crate::access::AccessPolicy;
use crate::bot_adapter::TelegramBotAdapter;
use crate::bridge::HttpGateway;
use crate::chain::HandlerChain;
use crate::config::AppConfig;
use crate::conversation::Conversations;
use crate::handlers::{
    AccessGate, AdminHandler, ExtractionHandler, LoggingHandler, SettingsHandler, StartHandler,
    UnknownCommandHandler,
};
use anyhow::Result;
use relay_core::{Bot as CoreBot, Gateway, UserId};
use relay_driver::{DriverConfig, JobCoordinator};
use std::sync::Arc;
use storage::{JobRepository, SettingsRepository, SqlitePoolManager};
use teloxide::Bot;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct AppComponents {
    pub settings: Arc<SettingsRepository>,
    pub jobs: Arc<JobRepository>,
    pub coordinator: JobCoordinator,
    pub policy: AccessPolicy,
    pub conversations: Conversations,
    /// Operator-facing bot used by handlers and status boards.
    pub bot: Arc<dyn CoreBot>,
}

impl AppComponents {
    /// Wires components from already-built parts (tests inject a fake gateway and bot here).
    pub fn from_parts(
        settings: Arc<SettingsRepository>,
        jobs: Arc<JobRepository>,
        gateway: Arc<dyn Gateway>,
        bot: Arc<dyn CoreBot>,
        sudo_users: Vec<UserId>,
        driver: DriverConfig,
    ) -> Self {
        let coordinator = JobCoordinator::new(gateway, settings.clone(), jobs.clone(), driver);
        let policy = AccessPolicy::new(settings.clone(), sudo_users);
        Self {
            settings,
            jobs,
            coordinator,
            policy,
            conversations: Conversations::new(),
            bot,
        }
    }
}

/// Creates the teloxide bot, honouring a custom API URL (e.g. a local mock server).
pub fn build_teloxide_bot(config: &AppConfig) -> Bot {
    let bot = Bot::new(config.bot_token.clone());
    match config.telegram_api_url.as_deref() {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

#[instrument(skip(config, teloxide_bot))]
pub async fn build_components(config: &AppConfig, teloxide_bot: Bot) -> Result<AppComponents> {
    let pool = SqlitePoolManager::new(&config.database_url)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                database_url = %config.database_url,
                "Failed to initialize storage"
            );
            anyhow::anyhow!("Failed to initialize storage: {}", e)
        })?;
    let settings = Arc::new(SettingsRepository::from_pool(pool.clone()));
    let jobs = Arc::new(JobRepository::from_pool(pool));

    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(
        config.gateway_url.clone(),
        config.gateway_token.clone(),
    )?);
    let bot: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(teloxide_bot));
    let driver = DriverConfig {
        download_dir: config.download_dir.clone(),
        ..DriverConfig::default()
    };

    info!(
        gateway_url = %config.gateway_url,
        sudo_users = config.sudo_users.len(),
        download_dir = %config.download_dir.display(),
        "Components built"
    );
    Ok(AppComponents::from_parts(
        settings,
        jobs,
        gateway,
        bot,
        config.sudo_users.clone(),
        driver,
    ))
}

/// Handler order matters: the gate must see every message before any command runs, and the
/// unknown-command reply goes last.
pub fn build_handler_chain(components: &AppComponents) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(AccessGate::new(
            components.settings.clone(),
            components.policy.clone(),
            components.conversations.clone(),
        )))
        .add_handler(Arc::new(StartHandler::new(
            components.settings.clone(),
            components.policy.clone(),
        )))
        .add_handler(Arc::new(AdminHandler::new(
            components.settings.clone(),
            components.jobs.clone(),
            components.policy.clone(),
            components.bot.clone(),
        )))
        .add_handler(Arc::new(SettingsHandler::new(
            components.settings.clone(),
            components.conversations.clone(),
        )))
        .add_handler(Arc::new(ExtractionHandler::new(
            components.settings.clone(),
            components.coordinator.clone(),
            components.conversations.clone(),
            components.bot.clone(),
        )))
        .add_handler(Arc::new(UnknownCommandHandler))
}
