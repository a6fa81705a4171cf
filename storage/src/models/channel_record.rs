use serde::{Deserialize, Serialize};

/// A destination channel registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelRecord {
    pub channel_id: String,
    pub channel_name: String,
}

impl ChannelRecord {
    /// Display name, falling back to the id when no name was given.
    pub fn label(&self) -> &str {
        if self.channel_name.is_empty() {
            &self.channel_id
        } else {
            &self.channel_name
        }
    }
}
