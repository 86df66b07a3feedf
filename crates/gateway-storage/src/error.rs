//! Error types for the storage module.

use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The table does not exist.
    #[error("table not found: {table}")]
    TableNotFound {
        /// The missing table.
        table: String,
    },

    /// The table already exists.
    #[error("table already exists: {table}")]
    TableExists {
        /// The existing table.
        table: String,
    },

    /// The backend reported a failure.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The backend dropped the completion callback without invoking it.
    #[error("storage operation was cancelled")]
    Cancelled,
}
