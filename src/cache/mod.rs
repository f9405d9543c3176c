use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

mod memory;
mod sqlite;

pub use memory::MemoryResultCache;
pub use sqlite::SqliteResultCache;

/// Rendered result pages keyed by the raw submitted URL.
///
/// Expiry is the store's job: `get` never returns an entry older than the TTL it was
/// written with.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, url: &str) -> Result<Option<String>>;

    async fn set(&self, url: &str, payload: &str, ttl: Duration) -> Result<()>;

    /// Drops expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64>;
}
