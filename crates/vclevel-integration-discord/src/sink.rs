//! LevelUpSink implementation for Discord

use async_trait::async_trait;
use tracing::debug;
use vclevel::{LevelUpSink, PrivilegeRef, SinkError};

use crate::client::DiscordClient;

/// Discord sink: DMs for notifications, guild roles for privileges
pub struct DiscordSink {
    client: DiscordClient,
    guild_id: u64,
}

impl DiscordSink {
    pub fn new(client: DiscordClient, guild_id: u64) -> Self {
        Self { client, guild_id }
    }
}

fn parse_user_id(user_id: &str) -> Result<u64, SinkError> {
    user_id
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| SinkError::InvalidId(user_id.to_string()))
}

#[async_trait]
impl LevelUpSink for DiscordSink {
    async fn notify(&self, user_id: &str, message: &str) -> Result<(), SinkError> {
        let id = parse_user_id(user_id)?;

        self.client
            .send_dm(id, message)
            .await
            .map_err(|e| SinkError::Notify {
                user_id: user_id.to_string(),
                reason: format!("Discord API error: {}", e),
            })?;

        Ok(())
    }

    async fn grant_privilege(
        &self,
        user_id: &str,
        privilege: PrivilegeRef,
    ) -> Result<(), SinkError> {
        let id = parse_user_id(user_id)?;
        if privilege.0 == 0 {
            return Err(SinkError::InvalidId(privilege.to_string()));
        }

        self.client
            .add_role(self.guild_id, id, privilege.0)
            .await
            .map_err(|e| SinkError::Grant {
                user_id: user_id.to_string(),
                reason: format!("Discord API error: {}", e),
            })?;

        debug!(user_id = %user_id, role_id = %privilege, "Role added");
        Ok(())
    }

    fn name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("80351110224678912").unwrap(), 80351110224678912);
        assert!(matches!(parse_user_id("abc"), Err(SinkError::InvalidId(_))));
        assert!(matches!(parse_user_id("0"), Err(SinkError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_invalid_user_is_rejected_before_any_request() {
        let sink = DiscordSink::new(DiscordClient::new("test-token"), 1);

        let result = sink.notify("not-a-snowflake", "hi").await;

        assert_eq!(result, Err(SinkError::InvalidId("not-a-snowflake".into())));
    }

    #[tokio::test]
    async fn test_zero_role_is_rejected() {
        let sink = DiscordSink::new(DiscordClient::new("test-token"), 1);

        let result = sink.grant_privilege("42", PrivilegeRef(0)).await;

        assert!(matches!(result, Err(SinkError::InvalidId(_))));
    }
}
