use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};

use super::ResultCache;

/// Cache rows live in the `result_cache` table so entries survive a restart.
#[derive(Clone)]
pub struct SqliteResultCache {
    pool: SqlitePool,
}

impl SqliteResultCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl ResultCache for SqliteResultCache {
    async fn get(&self, url: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            query_as(r#"SELECT payload FROM result_cache WHERE url = ?1 AND expires_at > ?2"#)
                .bind(url)
                .bind(now_millis())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn set(&self, url: &str, payload: &str, ttl: Duration) -> Result<()> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_millis().saturating_add(ttl_ms);
        query(
            r#"INSERT OR REPLACE INTO result_cache (url, payload, expires_at)
                VALUES (?1, ?2, ?3)"#,
        )
        .bind(url)
        .bind(payload)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let affected = query(r#"DELETE FROM result_cache WHERE expires_at <= ?1"#)
            .bind(now_millis())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }
}
