//! Row models for the storage crate.

mod bot_stats;
mod channel_record;
mod job_record;
mod user_settings;

pub use bot_stats::BotStats;
pub use channel_record::ChannelRecord;
pub use job_record::JobRecord;
pub use user_settings::{SetupItem, UserSettingsRecord};
