//! Active TCP reachability probe.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;

/// Connect timeout for a single probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("probe to {0} timed out")]
    Timeout(SocketAddr),

    #[error("probe to {addr} failed: {reason}")]
    Connect { addr: SocketAddr, reason: String },
}

/// Something that can tell whether an endpoint accepts inbound connections.
#[async_trait]
pub trait Prober: Send + Sync {
    /// `Ok(())` when the endpoint accepted a connection.
    async fn probe(&self, addr: SocketAddr) -> Result<(), ProbeError>;
}

/// Probes by opening (and immediately dropping) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, addr: SocketAddr) -> Result<(), ProbeError> {
        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Connect {
                addr,
                reason: e.to_string(),
            }),
            Err(_) => Err(ProbeError::Timeout(addr)),
        }
    }
}
