//! PostgreSQL sent-id store.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::Result;
use crate::storage::SentIdStore;

/// Sent-id store backed by a `sent_ids(ad_id TEXT PRIMARY KEY)` table.
///
/// Each call checks a connection out of the pool for the single statement it
/// runs; no transaction spans more than one operation.
#[derive(Clone)]
pub struct PgSentIdStore {
    pool: PgPool,
}

impl PgSentIdStore {
    /// Connect to the database, failing fast when it is unreachable.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(2).connect(url).await?;
        log::info!("Connected to sent-id database");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SentIdStore for PgSentIdStore {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS sent_ids (ad_id TEXT PRIMARY KEY)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT ad_id FROM sent_ids")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn insert_if_absent(&self, ad_id: &str) -> Result<bool> {
        let result =
            sqlx::query("INSERT INTO sent_ids (ad_id) VALUES ($1) ON CONFLICT (ad_id) DO NOTHING")
                .bind(ad_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }
}
