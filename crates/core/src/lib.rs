pub mod compliance;
pub mod config;
pub mod history;
pub mod metrics;
pub mod query;
pub mod reachability;
pub mod testing;

pub use compliance::{ComplianceEvaluator, ComplianceStatus, HitRunPolicy, TriState, UnsatisfiedMode};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use history::{
    HistoryError, HistoryRow, HistoryService, HistoryStore, MemoryHistoryStore, Page,
    SessionRecord, SqliteHistoryStore, TorrentSummary,
};
pub use query::{
    ComposedQuery, HistoryFilter, HistoryView, QueryComposer, QueryError, SortDirection,
    SortField, SortState,
};
pub use reachability::{
    ConnectableChecker, KeyValueCache, MemoryCache, PeerEndpoint, Prober, TcpProber,
};
