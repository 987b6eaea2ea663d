//! Error types for followup operations.

use brain_core::BrainError;
use database::{DatabaseError, FollowupStatus};
use relay_bridge::RelayError;
use thiserror::Error;

/// Errors that can occur while driving a followup.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced record does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// The request is missing or has malformed fields.
    #[error("{0}")]
    Validation(String),

    /// The followup is not in a state that allows the operation.
    #[error("Followup is {status}, cannot {action}")]
    InvalidTransition {
        id: String,
        status: FollowupStatus,
        action: &'static str,
    },

    /// The reply generator failed or timed out.
    #[error("reply generation failed: {0}")]
    Upstream(String),

    /// The relay bus rejected a publish.
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    /// Storage failure.
    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for EngineError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            DatabaseError::AlreadyExists { entity, id } => {
                EngineError::Validation(format!("{} already exists: {}", entity, id))
            }
            other => EngineError::Database(other),
        }
    }
}

impl From<BrainError> for EngineError {
    fn from(err: BrainError) -> Self {
        EngineError::Upstream(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
