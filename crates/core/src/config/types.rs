use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub hitrun: HitRunConfig,
    #[serde(default)]
    pub announce: AnnounceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("seedwatch.db")
}

/// Key/value cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Namespace prepended to every cache key.
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: default_cache_prefix(),
        }
    }
}

fn default_cache_prefix() -> String {
    "seedwatch".to_string()
}

/// Hit-and-run policy parameters (`hitrun.*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HitRunConfig {
    /// Whether hit-and-run evaluation is active at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum seed time in seconds.
    #[serde(default = "default_seedtime")]
    pub seedtime: u64,
    /// Share of the torrent size that may be downloaded without obligation.
    #[serde(default = "default_buffer")]
    pub buffer: f64,
}

impl Default for HitRunConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seedtime: default_seedtime(),
            buffer: default_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_seedtime() -> u64 {
    // 7 days
    604_800
}

fn default_buffer() -> f64 {
    0.03
}

/// Announce-time peer checks (`announce.*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnounceConfig {
    /// Probe peers for connectability. When off, every peer is reported
    /// as not connectable.
    #[serde(default = "default_true")]
    pub connectable_check: bool,
    /// Seconds a probe result is considered fresh.
    #[serde(default = "default_check_interval")]
    pub connectable_check_interval: u64,
    /// Upper bound on probes in flight at once.
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            connectable_check: true,
            connectable_check_interval: default_check_interval(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}

impl AnnounceConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.connectable_check_interval)
    }
}

fn default_check_interval() -> u64 {
    1200
}

fn default_max_concurrent_probes() -> usize {
    64
}

/// Session history query settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
    /// Deadline for a single history query against the store.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl HistoryConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn default_per_page() -> u32 {
    25
}

fn default_max_per_page() -> u32 {
    100
}

fn default_query_timeout() -> u64 {
    10
}
