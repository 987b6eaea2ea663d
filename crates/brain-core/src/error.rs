//! Error types for brain operations.

use thiserror::Error;

/// Errors that can occur while generating a reply.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The brain is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// The turns could not be turned into a reply.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The brain is misconfigured (missing key, bad model, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure talking to a remote model.
    #[error("network error: {0}")]
    Network(String),

    /// The remote model answered with an error status.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
}
