//! Store error types

use std::path::PathBuf;

use chronicle_core::error::ChangelogError;
use thiserror::Error;

/// Store-related errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened
    #[error("Failed to open changelog database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Category column could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Changelog document error
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
