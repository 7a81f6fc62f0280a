//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Variants follow the failure taxonomy of the app: auth failures and
/// policy denials are surfaced as-is and never retried; network failures
/// are terminal per attempt; validation failures are caught before any
/// request leaves the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Authentication failure (bad credentials, duplicate registration)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Authorization denial (row-level security rejection, missing role)
    #[error("Permission denied: {0}")]
    Denied(String),

    /// Transient network failure talking to the backend
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Object storage failure (upload/remove)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a permission-denied error
    pub fn denied(msg: impl Into<String>) -> Self {
        Self::Denied(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("title is required");
        assert_eq!(err.to_string(), "Validation error: title is required");

        let err = Error::denied("row-level security");
        assert_eq!(err.to_string(), "Permission denied: row-level security");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
