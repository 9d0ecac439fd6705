//! Async front for history queries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{HistoryError, HistoryRow, HistoryStore, Page};
use crate::metrics::{HISTORY_QUERIES, HISTORY_QUERY_DURATION};
use crate::query::{HistoryView, QueryComposer};

/// Runs history queries on the blocking pool with a deadline.
///
/// A query that misses the deadline is reported as [`HistoryError::Timeout`];
/// the blocking task itself is left to finish in the background.
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn HistoryStore>,
    composer: QueryComposer,
    timeout: Duration,
}

impl HistoryService {
    pub fn new(store: Arc<dyn HistoryStore>, composer: QueryComposer, timeout: Duration) -> Self {
        Self {
            store,
            composer,
            timeout,
        }
    }

    pub fn composer(&self) -> &QueryComposer {
        &self.composer
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Compose the view's state into a query and run it.
    pub async fn query(&self, view: &HistoryView) -> Result<Page<HistoryRow>, HistoryError> {
        let start = Instant::now();
        let result = self.run(view).await;

        let status = match &result {
            Ok(_) => "ok",
            Err(HistoryError::InvalidQuery(_)) => "invalid",
            Err(HistoryError::Timeout(_)) => "timeout",
            Err(HistoryError::Database(_)) => "error",
        };
        HISTORY_QUERIES
            .with_label_values(&[status])
            .inc();
        HISTORY_QUERY_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(page) => debug!(
                user_id = view.user_id,
                total = page.total,
                page = page.page,
                "History query completed"
            ),
            Err(e) => warn!(user_id = view.user_id, error = %e, "History query failed"),
        }

        result
    }

    async fn run(&self, view: &HistoryView) -> Result<Page<HistoryRow>, HistoryError> {
        let query = view.compose(&self.composer)?;
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || store.query(&query));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(HistoryError::Database(format!(
                "query task failed: {}",
                join_error
            ))),
            Err(_) => Err(HistoryError::Timeout(self.timeout)),
        }
    }
}
