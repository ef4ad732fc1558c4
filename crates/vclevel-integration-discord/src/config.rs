//! Discord configuration

use serde::{Deserialize, Serialize};

/// Configuration for Discord integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    pub token: String,
    /// Guild whose voice channels are tracked and whose roles are granted
    pub guild_id: u64,
    /// Prefix for text commands
    pub prefix: String,
}

impl DiscordConfig {
    /// Create a new Discord configuration with the default prefix
    pub fn new(token: impl Into<String>, guild_id: u64) -> Self {
        Self {
            token: token.into(),
            guild_id,
            prefix: "!".to_string(),
        }
    }

    /// Set the command prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}
