//! Discord API client wrapper

use serenity::http::Http;
use serenity::model::channel::Message as SerenityMessage;
use serenity::model::id::{GuildId, RoleId, UserId};
use std::sync::Arc;
use tracing::{debug, error};

/// Discord API client
#[derive(Clone)]
pub struct DiscordClient {
    http: Arc<Http>,
}

impl DiscordClient {
    /// Create a client from a bot token
    pub fn new(token: &str) -> Self {
        Self::from_http(Arc::new(Http::new(token)))
    }

    /// Reuse the HTTP handle of a running gateway client
    pub fn from_http(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Send a direct message to a user
    pub async fn send_dm(
        &self,
        user_id: u64,
        content: &str,
    ) -> Result<SerenityMessage, serenity::Error> {
        let user = UserId::new(user_id);
        debug!(user_id = %user_id, content_len = %content.len(), "Sending DM to Discord user");

        let channel = user.create_dm_channel(&*self.http).await?;
        let message = channel
            .say(&self.http, content)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to send Discord DM"))?;

        Ok(message)
    }

    /// Add a role to a guild member
    pub async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), serenity::Error> {
        debug!(
            guild_id = %guild_id,
            user_id = %user_id,
            role_id = %role_id,
            "Adding role to Discord member"
        );

        self.http
            .add_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                Some("VC level reward"),
            )
            .await
    }
}
