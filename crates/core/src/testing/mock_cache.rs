//! Mock key-value cache for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::reachability::{CacheError, KeyValueCache, Ttl};

/// Mock implementation of the KeyValueCache trait.
///
/// Unlike [`MemoryCache`](crate::reachability::MemoryCache), TTLs are
/// stored verbatim and never count down, so tests can script exact
/// remaining lifetimes. `set` makes an entry persistent and `expire`
/// records the requested TTL.
#[derive(Debug, Clone, Default)]
pub struct MockCache {
    entries: Arc<RwLock<HashMap<String, (String, Ttl)>>>,
    unavailable: Arc<RwLock<bool>>,
    operations: Arc<RwLock<Vec<String>>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with a scripted TTL.
    pub async fn insert(&self, key: &str, value: impl Into<String>, ttl: Ttl) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.into(), ttl));
    }

    /// Inspect an entry and its recorded TTL.
    pub async fn entry(&self, key: &str) -> Option<(String, Ttl)> {
        self.entries.read().await.get(key).cloned()
    }

    /// Make every subsequent operation fail.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Operation names in call order, e.g. `["ttl", "set", "expire"]`.
    pub async fn operations(&self) -> Vec<String> {
        self.operations.read().await.clone()
    }

    async fn record(&self, op: &str) -> Result<(), CacheError> {
        self.operations.write().await.push(op.to_string());
        if *self.unavailable.read().await {
            return Err(CacheError::Unavailable("mock cache offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueCache for MockCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.record("get").await?;
        Ok(self.entry(key).await.map(|(value, _)| value))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.record("set").await?;
        self.insert(key, value, Ttl::Persistent).await;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        self.record("expire").await?;
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.1 = Ttl::Remaining(ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Ttl, CacheError> {
        self.record("ttl").await?;
        Ok(self
            .entry(key)
            .await
            .map(|(_, ttl)| ttl)
            .unwrap_or(Ttl::Missing))
    }
}
