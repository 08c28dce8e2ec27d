//! Error types for the SMI library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SMI operations.
///
/// Data-quality problems in an extract (unparseable periods, non-numeric
/// counters, missing geography) are never errors; they are logged, counted and
/// surfaced in the [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, Error)]
pub enum SmiError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Extract has no header row or no columns.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A column required at a typed boundary is absent from the record set.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot or report could not be written or read back.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Warehouse store failure. Fatal to the synchronization run.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Result type alias for SMI operations.
pub type Result<T> = std::result::Result<T, SmiError>;
