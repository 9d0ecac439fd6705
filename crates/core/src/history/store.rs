//! History storage trait and errors.

use std::time::Duration;

use thiserror::Error;

use super::{HistoryRow, Page, SessionRecord, TorrentSummary};
use crate::query::{ComposedQuery, QueryError};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("History query timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}

/// Read/write access to session history joined with torrent metadata.
///
/// Writes exist for ingest and tests; the query path is read-only.
pub trait HistoryStore: Send + Sync {
    /// Insert or replace a torrent's metadata.
    fn upsert_torrent(&self, torrent: &TorrentSummary) -> Result<(), HistoryError>;

    /// Insert or replace the record for `(user_id, torrent_id)`.
    fn upsert_session(&self, record: &SessionRecord) -> Result<(), HistoryError>;

    /// Run a composed query: the user's records inner-joined with their
    /// torrents, filtered, sorted and paginated.
    fn query(&self, query: &ComposedQuery) -> Result<Page<HistoryRow>, HistoryError>;
}
