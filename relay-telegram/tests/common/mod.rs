#![allow(dead_code)]

pub mod mock_bot;
pub mod offline_gateway;

use chrono::Utc;
use mock_bot::{EditRecord, MockBot};
use offline_gateway::OfflineGateway;
use relay_core::{HandlerResponse, InboundMessage, UserId};
use relay_driver::DriverConfig;
use relay_telegram::{build_handler_chain, AppComponents, HandlerChain};
use std::sync::Arc;
use storage::{JobRepository, SettingsRepository, SqlitePoolManager};
use tokio::sync::mpsc;

/// Listed in SUDO_USERS for every harness.
pub const SUDO: UserId = 1;

pub struct Harness {
    pub components: AppComponents,
    pub chain: HandlerChain,
    pub bot: Arc<MockBot>,
    pub edits: mpsc::UnboundedReceiver<EditRecord>,
    _dir: tempfile::TempDir,
}

pub async fn harness() -> Harness {
    let pool = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    let settings = Arc::new(SettingsRepository::from_pool(pool.clone()));
    let jobs = Arc::new(JobRepository::from_pool(pool));
    let (bot, edits) = MockBot::with_receiver();
    let dir = tempfile::tempdir().unwrap();
    let driver = DriverConfig {
        download_dir: dir.path().to_path_buf(),
        ..DriverConfig::default()
    };

    let components = AppComponents::from_parts(
        settings,
        jobs,
        Arc::new(OfflineGateway),
        bot.clone(),
        vec![SUDO],
        driver,
    );
    let chain = build_handler_chain(&components);
    Harness {
        components,
        chain,
        bot,
        edits,
        _dir: dir,
    }
}

pub fn message(user_id: UserId, text: &str) -> InboundMessage {
    InboundMessage {
        id: "1".to_string(),
        user_id,
        username: Some(format!("user{}", user_id)),
        first_name: Some(format!("User {}", user_id)),
        chat_id: user_id,
        text: text.to_string(),
        created_at: Utc::now(),
    }
}

impl Harness {
    /// Runs `text` from `user_id` through the chain and returns the reply, if any.
    pub async fn say(&self, user_id: UserId, text: &str) -> Option<String> {
        match self.chain.handle(&message(user_id, text)).await.unwrap() {
            HandlerResponse::Reply(reply) => Some(reply),
            _ => None,
        }
    }

    /// Like [`Harness::say`] but the reply is required.
    pub async fn reply(&self, user_id: UserId, text: &str) -> String {
        self.say(user_id, text)
            .await
            .unwrap_or_else(|| panic!("expected a reply to {:?}", text))
    }

    /// Stores a complete setup for `user_id` directly in the repository.
    pub async fn configure(&self, user_id: UserId) {
        use storage::SettingField;
        let settings = &self.components.settings;
        settings.upsert_user(user_id, None, None).await.unwrap();
        settings
            .set_field(user_id, SettingField::Token, "eyJ0eXAiOiJKV1QiLCJhbGciOi.payload")
            .await
            .unwrap();
        settings
            .set_field(user_id, SettingField::UploaderCommand, "/Mahi")
            .await
            .unwrap();
        settings
            .set_field(user_id, SettingField::Credit, "@relay")
            .await
            .unwrap();
        settings.add_batch(user_id, "Arjuna JEE").await.unwrap();
        settings.add_batch(user_id, "Lakshya NEET").await.unwrap();
        settings.add_channel(user_id, "-100111", "Main").await.unwrap();
    }

    /// Waits for the status board's final report (a message starting with ✅ or ❌).
    pub async fn final_edit(&mut self) -> EditRecord {
        let deadline = std::time::Duration::from_secs(10);
        tokio::time::timeout(deadline, async {
            loop {
                let edit = self.edits.recv().await.expect("edit channel closed");
                if edit.text.starts_with('✅') || edit.text.starts_with('❌') {
                    return edit;
                }
            }
        })
        .await
        .expect("no final status edit")
    }
}
