//! Durable Store Port
//!
//! Authoritative persistence for progress records.

use async_trait::async_trait;

use crate::domain::{LevelDelta, ProgressRecord, StoreError};

/// Repository interface for the durable (authoritative) tier
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Find a record by member ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ProgressRecord>, StoreError>;

    /// Atomically add `delta.level` to the level and reset exp to 0,
    /// creating the record first if it does not exist
    async fn upsert_increment(
        &self,
        id: &str,
        delta: LevelDelta,
    ) -> Result<ProgressRecord, StoreError>;

    /// Insert the default record.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if a record already exists;
    /// the existing record is left untouched.
    async fn insert_default(&self, id: &str) -> Result<ProgressRecord, StoreError>;
}
