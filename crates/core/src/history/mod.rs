//! Session history records and the stores that serve them.

mod memory_store;
mod service;
mod sqlite_store;
mod store;
mod types;

pub use memory_store::MemoryHistoryStore;
pub use service::HistoryService;
pub use sqlite_store::SqliteHistoryStore;
pub use store::{HistoryError, HistoryStore};
pub use types::{HistoryRow, Page, SessionRecord, TorrentSummary};
