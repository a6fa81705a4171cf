//! Storage crate: SQLite persistence for user settings and job records.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserSettingsRecord, ChannelRecord, JobRecord, BotStats
//! - [`settings_repo`] – SettingsRepository (also a `ProfileStore`)
//! - [`job_repo`] – JobRepository (also a `JobStore`)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod job_repo;
mod models;
mod schema;
mod settings_repo;
mod sqlite_pool;

pub use error::StorageError;
pub use job_repo::JobRepository;
pub use models::{BotStats, ChannelRecord, JobRecord, SetupItem, UserSettingsRecord};
pub use settings_repo::{
    SettingField, SettingsRepository, DEFAULT_EXTRACTOR_BOT, DEFAULT_UPLOADER_BOT,
};
pub use sqlite_pool::SqlitePoolManager;
