//! Common error types for invx

use thiserror::Error;

/// Common result type for invx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across invx services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metric sample storage could not be reached
    #[error("Metric store unavailable: {0}")]
    StoreUnavailable(String),

    /// Viewer connection registry could not be read or updated
    #[error("Connection registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error only degrades the metrics subsystem
    ///
    /// Degraded errors are logged and skipped by the recording and
    /// broadcast paths; they never fail document processing.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_) | Error::RegistryUnavailable(_))
    }
}
