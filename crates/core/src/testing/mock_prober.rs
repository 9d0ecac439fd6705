//! Mock prober for testing.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::reachability::{ProbeError, Prober};

/// A recorded probe for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedProbe {
    pub addr: SocketAddr,
    pub timestamp: Instant,
}

/// Mock implementation of the Prober trait.
///
/// Answers every probe with a fixed outcome, optionally after a delay,
/// and records the addresses it was asked about.
#[derive(Debug, Clone)]
pub struct MockProber {
    reachable: Arc<RwLock<bool>>,
    delay: Option<Duration>,
    probes: Arc<RwLock<Vec<RecordedProbe>>>,
}

impl MockProber {
    /// A prober that reports every endpoint reachable.
    pub fn connectable() -> Self {
        Self::with_outcome(true)
    }

    /// A prober that refuses every endpoint.
    pub fn unreachable() -> Self {
        Self::with_outcome(false)
    }

    fn with_outcome(reachable: bool) -> Self {
        Self {
            reachable: Arc::new(RwLock::new(reachable)),
            delay: None,
            probes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change the outcome of subsequent probes.
    pub async fn set_reachable(&self, reachable: bool) {
        *self.reachable.write().await = reachable;
    }

    /// Get the number of probes performed.
    pub async fn probe_count(&self) -> usize {
        self.probes.read().await.len()
    }

    /// Get recorded probes.
    pub async fn recorded_probes(&self) -> Vec<RecordedProbe> {
        self.probes.read().await.clone()
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn probe(&self, addr: SocketAddr) -> Result<(), ProbeError> {
        self.probes.write().await.push(RecordedProbe {
            addr,
            timestamp: Instant::now(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if *self.reachable.read().await {
            Ok(())
        } else {
            Err(ProbeError::Connect {
                addr,
                reason: "connection refused".to_string(),
            })
        }
    }
}
