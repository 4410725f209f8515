//! Error types for validation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for resource lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Result type alias for writing and reading validation records.
pub type ValidateResult<T> = Result<T, ValidateError>;

/// A single resource lookup failed.
///
/// Absorbed by the validator: the affected field becomes unknown / absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{service} API error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },

    #[error("Lookup of {resource} timed out after {secs} seconds")]
    Timeout { resource: String, secs: u64 },
}

/// Errors persisting the validation record.
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
