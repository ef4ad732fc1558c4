//! Fast Store Port
//!
//! Ephemeral key-value cache in front of the durable tier. Never
//! authoritative: entries may be missing, stale or flushed at any time,
//! and concurrent writes for the same key are last-writer-wins.

use async_trait::async_trait;

use crate::domain::{ProgressRecord, StoreError};

/// Cache interface keyed by member ID
#[async_trait]
pub trait FastStore: Send + Sync {
    /// Read the cached record, `None` on a miss
    async fn get(&self, id: &str) -> Result<Option<ProgressRecord>, StoreError>;

    /// Overwrite the cached record for `record.id`
    async fn set(&self, record: &ProgressRecord) -> Result<(), StoreError>;

    /// Drop every cached entry
    async fn flush(&self) -> Result<(), StoreError>;
}
