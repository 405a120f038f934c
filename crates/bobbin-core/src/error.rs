//! Error types for the Bobbin catalog.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for catalog operations.
#[derive(Debug, Error)]
pub enum BobbinError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Catalog errors
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Model not found: {model_id}")]
    ModelNotFound { model_id: String },

    #[error("Series not found: {series_id}")]
    SeriesNotFound { series_id: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, BobbinError>;

// Conversion implementations for common error types

impl From<std::io::Error> for BobbinError {
    fn from(err: std::io::Error) -> Self {
        BobbinError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for BobbinError {
    fn from(err: serde_json::Error) -> Self {
        BobbinError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for BobbinError {
    fn from(err: rusqlite::Error) -> Self {
        BobbinError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl BobbinError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        BobbinError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether this error is caused by bad client input rather than
    /// server-side failure. The HTTP layer uses this to pick 4xx over 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BobbinError::UnknownCategory(_)
                | BobbinError::ModelNotFound { .. }
                | BobbinError::SeriesNotFound { .. }
                | BobbinError::Validation { .. }
        )
    }
}
