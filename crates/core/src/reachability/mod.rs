//! Peer connectability checks backed by a short-lived key/value cache.
//!
//! A peer is connectable when a TCP connection to its advertised endpoint
//! succeeds. Probing is expensive, so results are cached per
//! `(ip, port, agent)` and only re-probed once the remaining TTL falls below
//! the configured check interval.

mod cache;
mod checker;
mod endpoint;
mod memory_cache;
mod prober;

pub use cache::{CacheError, KeyValueCache, Ttl};
pub use checker::{ConnectableChecker, CACHE_SAFETY_MARGIN};
pub use endpoint::{connectable_cache_key, PeerEndpoint, ReachabilityError};
pub use memory_cache::{MemoryCache, DEFAULT_SWEEP_INTERVAL};
pub use prober::{ProbeError, Prober, TcpProber, PROBE_TIMEOUT};
