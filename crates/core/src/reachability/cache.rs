//! Typed key/value cache abstraction.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a cache backend.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the operation.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Remaining lifetime of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key does not exist.
    Missing,
    /// The key exists but never expires.
    Persistent,
    /// The key expires after this duration.
    Remaining(Duration),
}

/// Minimal key/value cache with expiry, modelled on the operations a shared
/// cache service offers.
///
/// Values are opaque strings; callers own their encoding. `get` returning
/// `Ok(None)` means the key is absent, never a stored "false".
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value. Overwrites any previous value and clears its expiry.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Set the expiry of an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Remaining lifetime of a key.
    async fn ttl(&self, key: &str) -> Result<Ttl, CacheError>;
}
