use thiserror::Error;

/// Structurally invalid query input supplied by the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown sort field: {0:?}")]
    InvalidSortField(String),

    #[error("invalid sort direction: {0:?} (expected \"asc\" or \"desc\")")]
    InvalidSortDirection(String),

    #[error("invalid page {0}: pages start at 1")]
    InvalidPage(i64),

    #[error("invalid page size {0}")]
    InvalidPageSize(i64),
}
