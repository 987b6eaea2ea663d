//! Error types for relay-bridge.

use thiserror::Error;

/// Errors that can occur when talking to the relay bus.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Redis connection or command failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A relay address could not be parsed.
    #[error("Invalid relay address: {0}")]
    InvalidAddress(String),

    /// A message arrived on a channel this crate does not handle.
    #[error("Unexpected channel: {0}")]
    UnexpectedChannel(String),

    /// The bus has shut down.
    #[error("Relay bus closed")]
    Closed,
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
