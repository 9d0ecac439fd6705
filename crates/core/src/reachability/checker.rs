//! Cached connectability checks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::{connectable_cache_key, KeyValueCache, PeerEndpoint, ProbeError, Prober, Ttl};
use crate::config::AnnounceConfig;
use crate::metrics::{
    CONNECTABLE_CACHE_LOOKUPS, CONNECTABLE_CHECKS, CONNECTABLE_PROBES, CONNECTABLE_PROBE_DURATION,
};

/// Extra lifetime given to stored results beyond the check interval, so an
/// entry survives late re-checks while still being refreshed on schedule.
pub const CACHE_SAFETY_MARGIN: Duration = Duration::from_secs(3600);

/// Answers "is this peer connectable?" with a cache in front of active probes.
///
/// Every failure (disabled check, malformed address, cache outage, probe
/// failure, caller deadline) resolves to `false` or to a fresh probe; a
/// check never returns an error.
pub struct ConnectableChecker {
    enabled: bool,
    interval: Duration,
    prefix: String,
    cache: Arc<dyn KeyValueCache>,
    prober: Arc<dyn Prober>,
    probe_slots: Semaphore,
}

impl ConnectableChecker {
    pub fn new(
        config: &AnnounceConfig,
        prefix: impl Into<String>,
        cache: Arc<dyn KeyValueCache>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self {
            enabled: config.connectable_check,
            interval: config.check_interval(),
            prefix: prefix.into(),
            cache,
            prober,
            probe_slots: Semaphore::new(config.max_concurrent_probes.max(1)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Lifetime given to a freshly stored probe result.
    pub fn stored_ttl(&self) -> Duration {
        self.interval + CACHE_SAFETY_MARGIN
    }

    /// Check an endpoint, probing only when no fresh cached result exists.
    pub async fn is_connectable(&self, endpoint: &PeerEndpoint) -> bool {
        if !self.enabled {
            CONNECTABLE_CHECKS.with_label_values(&["disabled"]).inc();
            return false;
        }

        let ip = match endpoint.ip_addr() {
            Ok(ip) => ip,
            Err(e) => {
                debug!(error = %e, "Skipping connectability probe");
                CONNECTABLE_CHECKS.with_label_values(&["malformed"]).inc();
                return false;
            }
        };

        let key = connectable_cache_key(&self.prefix, ip, endpoint.port, &endpoint.agent);

        let connectable = match self.fresh_cached(&key).await {
            Some(cached) => cached,
            None => {
                let connectable = self.probe(SocketAddr::new(ip, endpoint.port)).await;
                self.store(&key, connectable).await;
                connectable
            }
        };

        let result = if connectable {
            "connectable"
        } else {
            "not_connectable"
        };
        CONNECTABLE_CHECKS.with_label_values(&[result]).inc();
        connectable
    }

    /// Like [`is_connectable`](Self::is_connectable) but gives up after
    /// `deadline`, reporting the peer as not connectable.
    pub async fn is_connectable_within(&self, endpoint: &PeerEndpoint, deadline: Duration) -> bool {
        match tokio::time::timeout(deadline, self.is_connectable(endpoint)).await {
            Ok(connectable) => connectable,
            Err(_) => {
                debug!(ip = %endpoint.ip, port = endpoint.port, "Connectability check hit caller deadline");
                CONNECTABLE_CHECKS.with_label_values(&["deadline"]).inc();
                false
            }
        }
    }

    /// Cached result if present, decodable and not due for refresh.
    async fn fresh_cached(&self, key: &str) -> Option<bool> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                CONNECTABLE_CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                return None;
            }
            Err(e) => {
                warn!(error = %e, key, "Connectable cache read failed, probing");
                CONNECTABLE_CACHE_LOOKUPS.with_label_values(&["error"]).inc();
                return None;
            }
        };

        let cached: bool = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(_) => {
                debug!(key, raw = %raw, "Undecodable connectable cache entry, probing");
                CONNECTABLE_CACHE_LOOKUPS
                    .with_label_values(&["undecodable"])
                    .inc();
                return None;
            }
        };

        match self.cache.ttl(key).await {
            // TTLs are compared in whole seconds; equal to the interval is still fresh.
            Ok(Ttl::Remaining(remaining)) if remaining.as_secs() >= self.interval.as_secs() => {
                CONNECTABLE_CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                Some(cached)
            }
            Ok(_) => {
                CONNECTABLE_CACHE_LOOKUPS.with_label_values(&["stale"]).inc();
                None
            }
            Err(e) => {
                warn!(error = %e, key, "Connectable cache TTL lookup failed, probing");
                CONNECTABLE_CACHE_LOOKUPS.with_label_values(&["error"]).inc();
                None
            }
        }
    }

    async fn probe(&self, addr: SocketAddr) -> bool {
        let Ok(_permit) = self.probe_slots.acquire().await else {
            return false;
        };

        let start = Instant::now();
        let outcome = self.prober.probe(addr).await;
        CONNECTABLE_PROBE_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        match outcome {
            Ok(()) => {
                CONNECTABLE_PROBES.with_label_values(&["connectable"]).inc();
                true
            }
            Err(ProbeError::Timeout(_)) => {
                debug!(%addr, "Connectability probe timed out");
                CONNECTABLE_PROBES.with_label_values(&["timeout"]).inc();
                false
            }
            Err(e) => {
                debug!(error = %e, "Connectability probe failed");
                CONNECTABLE_PROBES.with_label_values(&["unreachable"]).inc();
                false
            }
        }
    }

    async fn store(&self, key: &str, connectable: bool) {
        if let Err(e) = self.cache.set(key, connectable.to_string()).await {
            warn!(error = %e, key, "Failed to cache connectable result");
            return;
        }
        if let Err(e) = self.cache.expire(key, self.stored_ttl()).await {
            warn!(error = %e, key, "Failed to set connectable cache expiry");
        }
    }
}
