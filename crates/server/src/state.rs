use std::sync::Arc;

use seedwatch_core::{
    history::{HistoryService, HistoryStore},
    reachability::{KeyValueCache, Prober},
    Config, ConnectableChecker, HitRunPolicy, QueryComposer,
};

/// Shared application state
pub struct AppState {
    config: Config,
    history: HistoryService,
    checker: ConnectableChecker,
}

impl AppState {
    /// Wire the history service and connectability checker from their
    /// config sections.
    pub fn new(
        config: Config,
        store: Arc<dyn HistoryStore>,
        cache: Arc<dyn KeyValueCache>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        let composer = QueryComposer::new(HitRunPolicy::from(&config.hitrun), &config.history);
        let history = HistoryService::new(store, composer, config.history.query_timeout());
        let checker =
            ConnectableChecker::new(&config.announce, config.cache.prefix.clone(), cache, prober);

        Self {
            config,
            history,
            checker,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    pub fn checker(&self) -> &ConnectableChecker {
        &self.checker
    }
}
