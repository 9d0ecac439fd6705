use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a connectability check could not even start.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReachabilityError {
    #[error("malformed peer address: {0:?}")]
    MalformedAddress(String),
}

/// A peer's advertised endpoint as seen on announce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerEndpoint {
    /// IP literal as reported; IPv6 may be bracketed.
    pub ip: String,
    pub port: u16,
    /// Client agent string.
    pub agent: String,
}

impl PeerEndpoint {
    pub fn new(ip: impl Into<String>, port: u16, agent: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            agent: agent.into(),
        }
    }

    /// Parse the IP literal, accepting a bracketed IPv6 form.
    pub fn ip_addr(&self) -> Result<IpAddr, ReachabilityError> {
        let trimmed = self.ip.trim();
        let unbracketed = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed);

        unbracketed
            .parse::<IpAddr>()
            .map_err(|_| ReachabilityError::MalformedAddress(self.ip.clone()))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ReachabilityError> {
        Ok(SocketAddr::new(self.ip_addr()?, self.port))
    }
}

/// Cache key for a probe result:
/// `<prefix>:peers:connectable:<ip>-<port>-<agent>`, IPv6 bracketed.
pub fn connectable_cache_key(prefix: &str, ip: IpAddr, port: u16, agent: &str) -> String {
    let literal = match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{}]", v6),
    };
    format!("{}:peers:connectable:{}-{}-{}", prefix, literal, port, agent)
}
