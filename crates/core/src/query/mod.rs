//! Composition of session history queries.
//!
//! A [`HistoryFilter`] plus sort and page selection is turned by the
//! [`QueryComposer`] into a [`ComposedQuery`]: an ordered list of independent
//! [`Predicate`]s (combined with AND), an allow-listed sort, and a page
//! window. Store backends either translate the predicates to SQL or
//! evaluate them in memory.

mod composer;
mod error;
mod filter;
mod predicate;
mod sort;
mod view;

pub use composer::{ComposedQuery, QueryComposer};
pub use error::QueryError;
pub use filter::{HistoryFilter, NamePattern};
pub use predicate::Predicate;
pub use sort::{SortDirection, SortField, SortState};
pub use view::HistoryView;
