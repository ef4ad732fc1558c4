//! PostgreSQL implementation of DurableStore

use async_trait::async_trait;
use sqlx::PgPool;

use vclevel::{DurableStore, LevelDelta, ProgressRecord, StoreError};

/// PostgreSQL implementation of DurableStore
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct ProgressRow {
    id: String,
    level: i64,
    exp: i64,
}

impl TryFrom<ProgressRow> for ProgressRecord {
    type Error = StoreError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        let level = u64::try_from(row.level).map_err(|e| StoreError::corrupt(&row.id, e))?;
        let exp = u64::try_from(row.exp).map_err(|e| StoreError::corrupt(&row.id, e))?;

        Ok(Self {
            id: row.id,
            level,
            exp,
        })
    }
}

fn store_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateKey(db.message().to_string())
        }
        _ => StoreError::Unavailable(e.to_string()),
    }
}

#[async_trait]
impl DurableStore for PgProgressStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT id, level, exp FROM progress WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn upsert_increment(
        &self,
        id: &str,
        delta: LevelDelta,
    ) -> Result<ProgressRecord, StoreError> {
        let increment = i64::try_from(delta.level).map_err(|e| StoreError::corrupt(id, e))?;

        // Single statement: concurrent level-ups for one id serialize on the row lock
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            INSERT INTO progress (id, level, exp)
            VALUES ($1, $2, 0)
            ON CONFLICT (id) DO UPDATE
            SET level = progress.level + EXCLUDED.level, exp = 0, updated_at = NOW()
            RETURNING id, level, exp
            "#,
        )
        .bind(id)
        .bind(increment)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        row.try_into()
    }

    async fn insert_default(&self, id: &str) -> Result<ProgressRecord, StoreError> {
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            INSERT INTO progress (id)
            VALUES ($1)
            RETURNING id, level, exp
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let row = ProgressRow {
            id: "u1".into(),
            level: 3,
            exp: 0,
        };
        let record = ProgressRecord::try_from(row).unwrap();
        assert_eq!(record.level, 3);
    }

    #[test]
    fn test_negative_row_is_corrupt() {
        let row = ProgressRow {
            id: "u1".into(),
            level: -1,
            exp: 0,
        };
        assert!(matches!(
            ProgressRecord::try_from(row),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }
}
