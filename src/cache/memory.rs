use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::ResultCache;

#[derive(Debug)]
struct Entry {
    payload: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryResultCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[async_trait]
impl ResultCache for MemoryResultCache {
    async fn get(&self, url: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        match entries.get(url) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.payload.clone())),
            Some(_) => {
                entries.remove(url);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, url: &str, payload: &str, ttl: Duration) -> Result<()> {
        self.entries.lock().insert(
            url.to_string(),
            Entry {
                payload: payload.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
