//! Redis implementation of FastStore
//!
//! | Key | Type | Value |
//! |-----|------|-------|
//! | `{user_id}` | String | JSON `{id, level, exp}` |

use async_trait::async_trait;
use fred::prelude::*;

use vclevel::{FastStore, ProgressRecord, StoreError};

/// Redis implementation of FastStore
#[derive(Clone)]
pub struct RedisProgressCache {
    client: Client,
}

impl RedisProgressCache {
    /// Connect to Redis at the given URL (`redis://host:port[/db]`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid Redis URL: {e}")))?;

        let client = Builder::from_config(config).build().map_err(store_error)?;
        client.init().await.map_err(store_error)?;

        tracing::info!("⚡ Connected to Redis");
        Ok(Self { client })
    }
}

fn store_error(e: fred::error::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Decode a cached value, checking it belongs to `id`
fn decode(id: &str, raw: &str) -> Result<ProgressRecord, StoreError> {
    let record: ProgressRecord =
        serde_json::from_str(raw).map_err(|e| StoreError::corrupt(id, e))?;

    if record.id != id {
        return Err(StoreError::corrupt(
            id,
            format!("cached under another id ({})", record.id),
        ));
    }

    Ok(record)
}

#[async_trait]
impl FastStore for RedisProgressCache {
    async fn get(&self, id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        let value: Option<String> = self.client.get(id).await.map_err(store_error)?;
        value.map(|raw| decode(id, &raw)).transpose()
    }

    async fn set(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record).map_err(|e| StoreError::corrupt(&record.id, e))?;
        let _: () = self
            .client
            .set(record.id.as_str(), json.as_str(), None, None, false)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let _: () = self.client.flushall(false).await.map_err(store_error)?;
        Ok(())
    }
}
