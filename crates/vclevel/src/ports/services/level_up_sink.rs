//! Level-up Sink Port
//!
//! Delivers the visible side effects of a level transition.
//!
//! Implementations live in platform integration crates
//! (e.g., vclevel-integration-discord).

use async_trait::async_trait;

use crate::domain::{PrivilegeRef, SinkError};

/// Notification and privilege interface
///
/// Both calls are best-effort: callers log failures and move on, they never
/// retry.
#[async_trait]
pub trait LevelUpSink: Send + Sync {
    /// Send a direct message to a member
    async fn notify(&self, user_id: &str, message: &str) -> Result<(), SinkError>;

    /// Grant a privilege (role) to a member
    async fn grant_privilege(
        &self,
        user_id: &str,
        privilege: PrivilegeRef,
    ) -> Result<(), SinkError>;

    /// Get the sink name (e.g., "discord")
    fn name(&self) -> &str;
}
