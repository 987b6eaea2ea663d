//! Error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use followup_engine::EngineError;
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;

/// Errors returned by handlers, rendered as `{success:false, message, error}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// The identity provider or the reply brain failed.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::NotFound(message) | ApiError::BadRequest(message) => json!({
                "success": false,
                "message": message,
                "error": status.canonical_reason(),
            }),
            ApiError::Upstream(detail) => {
                tracing::error!("Upstream error: {}", detail);
                json!({
                    "success": false,
                    "message": "Upstream service failed",
                    "error": detail,
                })
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                json!({
                    "success": false,
                    "message": "Internal server error",
                    "error": detail,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            EngineError::Validation(_) | EngineError::InvalidTransition { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            EngineError::Upstream(message) => ApiError::Upstream(message),
            EngineError::Relay(_) | EngineError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        EngineError::from(err).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database::FollowupStatus;

    #[test]
    fn test_engine_errors_map_to_status() {
        let not_found: ApiError = EngineError::NotFound {
            entity: "Followup",
            id: "f1".to_string(),
        }
        .into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Followup not found");

        let transition: ApiError = EngineError::InvalidTransition {
            id: "f1".to_string(),
            status: FollowupStatus::InProgress,
            action: "start",
        }
        .into();
        assert_eq!(transition.status(), StatusCode::BAD_REQUEST);

        let upstream: ApiError = EngineError::Upstream("overloaded".to_string()).into();
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_is_bad_request() {
        let err: ApiError = DatabaseError::AlreadyExists {
            entity: "Agent",
            id: "Greeter".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
