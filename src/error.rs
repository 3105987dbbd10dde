//! Error Module
//!
//! Error types for the batch report path. Validation errors are raised before
//! the task store is touched; store errors are the only retryable class.

use thiserror::Error;

/// Failure of the underlying task store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to an export task
    #[error("corrupt task row {pk}: {reason}")]
    CorruptRow { pk: i64, reason: String },
}

/// Errors surfaced by the export batch query
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid orderby: {0}")]
    InvalidOrder(String),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Task store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl MonitorError {
    /// True for errors caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MonitorError::StoreUnavailable(_))
    }
}

/// Failure while rendering a report chunk
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize batch record: {0}")]
    Serialize(#[from] serde_json::Error),
}
