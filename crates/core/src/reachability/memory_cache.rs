//! In-process cache backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{CacheError, KeyValueCache, Ttl};

/// Minimum time between expiry sweeps triggered by writes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

struct Entries {
    map: HashMap<String, Entry>,
    last_sweep: Instant,
}

impl Entries {
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, e| !e.is_expired(now));
        self.last_sweep = now;
        before - self.map.len()
    }
}

/// Process-local [`KeyValueCache`] with lazy expiry.
///
/// Expired keys are dropped when read, and writes sweep the whole map at
/// most once per sweep interval, so keys that are never read again do not
/// accumulate. A shared deployment plugs a networked cache in through the
/// same trait.
pub struct MemoryCache {
    entries: RwLock<Entries>,
    sweep_interval: Duration,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            sweep_interval,
        }
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.map.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired key. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.entries.write().await.sweep(Instant::now())
    }

    #[cfg(test)]
    async fn stored_keys(&self) -> usize {
        self.entries.read().await.map.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.map.get(key) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: remove it so the map does not grow with dead keys.
        let mut entries = self.entries.write().await;
        if entries.map.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.map.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if now.duration_since(entries.last_sweep) >= self.sweep_interval {
            let removed = entries.sweep(now);
            if removed > 0 {
                debug!(removed, "Swept expired cache entries");
            }
        }
        entries.map.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.map.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Ttl, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(match entries.map.get(key) {
            None => Ttl::Missing,
            Some(entry) => match entry.expires_at {
                None => Ttl::Persistent,
                Some(at) if at <= now => Ttl::Missing,
                Some(at) => Ttl::Remaining(at - now),
            },
        })
    }
}
