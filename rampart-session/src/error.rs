//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Key is empty or contains an empty path segment
    #[error("Invalid session key: \"{0}\"")]
    InvalidKey(String),

    /// Session expired
    #[error("Session expired: {0}")]
    Expired(String),
}
