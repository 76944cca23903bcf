//! # Error Types
//!
//! Custom error types for the cellular logger using `thiserror`.

use std::time::Duration;
use thiserror::Error;

/// Main error type for the cellular logger
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A mailbox or connection wait expired without a signal
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Modem operation errors
    #[error("Modem error: {0}")]
    Modem(String),

    /// Encoded frame does not fit the output buffer
    #[error("Encoded frame needs {len} bytes, buffer holds {capacity}")]
    Encode { len: usize, capacity: usize },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upload transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoggerError {
    /// Returns `true` for a wait that expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LoggerError::Timeout(_))
    }
}

/// Result type alias for the cellular logger
pub type Result<T> = std::result::Result<T, LoggerError>;
