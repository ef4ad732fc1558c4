//! Progression Repository - cache-aside view over the two store tiers
//!
//! Reads go fast store first, then durable store, then lazy creation.
//! Level-ups are committed to the durable store and mirrored into the
//! cache. Sub-threshold experience lives in the fast store only, so the
//! durable tier sees one write per level rather than one per tick.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{LevelDelta, ProgressRecord, StoreError};
use crate::ports::{DurableStore, FastStore};

/// Repository configuration
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Upper bound for any single store call
    pub store_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Where a looked-up record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Cache,
    Durable,
    /// Absent from both tiers; a default was created
    Created,
    /// The durable tier could not be read; the default is a stand-in only
    Fallback,
}

/// Result of a repository lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub record: ProgressRecord,
    pub source: RecordSource,
}

/// Cache-aside repository combining a durable and a fast store
pub struct ProgressionRepository<D: DurableStore, F: FastStore> {
    durable: Arc<D>,
    fast: Arc<F>,
    config: RepositoryConfig,
}

impl<D: DurableStore, F: FastStore> ProgressionRepository<D, F> {
    pub fn new(durable: Arc<D>, fast: Arc<F>, config: Option<RepositoryConfig>) -> Self {
        Self {
            durable,
            fast,
            config: config.unwrap_or_default(),
        }
    }

    /// Drop every cached entry.
    ///
    /// Run once at process start so nothing cached by a previous run is
    /// served. Returns whether the flush went through.
    pub async fn reset_cache(&self) -> bool {
        match self.bounded(self.fast.flush()).await {
            Ok(()) => {
                tracing::info!("🧹 Fast store flushed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to flush fast store");
                false
            }
        }
    }

    /// Current record for `id`. Never fails.
    pub async fn get_record(&self, id: &str) -> ProgressRecord {
        self.lookup(id).await.record
    }

    /// Current record for `id` together with the tier that answered.
    pub async fn lookup(&self, id: &str) -> Lookup {
        match self.bounded(self.fast.get(id)).await {
            Ok(Some(record)) => {
                return Lookup {
                    record,
                    source: RecordSource::Cache,
                }
            }
            Ok(None) => debug!(user_id = %id, "Fast store miss"),
            Err(e) => debug!(user_id = %id, error = %e, "Fast store read failed"),
        }

        match self.bounded(self.durable.find_by_id(id)).await {
            Ok(Some(record)) => {
                self.cache(&record).await;
                Lookup {
                    record,
                    source: RecordSource::Durable,
                }
            }
            Ok(None) => Lookup {
                record: self.create_record(id).await,
                source: RecordSource::Created,
            },
            Err(e) => {
                warn!(user_id = %id, error = %e, "Durable store read failed, using default");
                Lookup {
                    record: ProgressRecord::new_default(id),
                    source: RecordSource::Fallback,
                }
            }
        }
    }

    /// Write the default record to both tiers, best-effort.
    ///
    /// A duplicate key means a concurrent create won; its row stays and the
    /// cache is left alone so the next read picks the winner up.
    pub async fn create_record(&self, id: &str) -> ProgressRecord {
        let record = ProgressRecord::new_default(id);

        match self.bounded(self.durable.insert_default(id)).await {
            Ok(_) => debug!(user_id = %id, "Created progress record"),
            Err(e) if e.is_duplicate() => {
                debug!(user_id = %id, "Progress record already created elsewhere");
                return record;
            }
            Err(e) => warn!(user_id = %id, error = %e, "Failed to create progress record"),
        }

        self.cache(&record).await;
        record
    }

    /// Commit a level transition.
    ///
    /// The durable store increments the level and resets exp in one
    /// statement; the result then replaces the cached entry.
    pub async fn record_level_up(&self, id: &str) -> Result<ProgressRecord, StoreError> {
        let updated = self
            .bounded(self.durable.upsert_increment(id, LevelDelta::ONE))
            .await?;

        self.cache(&updated).await;
        Ok(updated)
    }

    /// Store sub-threshold experience in the fast store only.
    ///
    /// `current` is the record the gain was computed from. The durable tier
    /// is not touched, so this progress is lost if the cache is flushed or
    /// evicted before the next level-up.
    pub async fn record_exp_gain(
        &self,
        current: &ProgressRecord,
        new_exp: u64,
    ) -> Result<ProgressRecord, StoreError> {
        let updated = current.with_exp(new_exp);
        self.bounded(self.fast.set(&updated)).await?;
        Ok(updated)
    }

    async fn cache(&self, record: &ProgressRecord) {
        if let Err(e) = self.bounded(self.fast.set(record)).await {
            debug!(user_id = %record.id, error = %e, "Fast store write failed");
        }
    }

    async fn bounded<T, Fut>(&self, call: Fut) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.config.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.config.store_timeout)))
    }
}
