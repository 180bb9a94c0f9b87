use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Internal(String),
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Resource".to_string()),
            RepositoryError::Duplicate(msg) => UsecaseError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

/// Bodies that are not valid JSON or do not fit the request type are a
/// validation failure, answered like any other.
impl From<JsonRejection> for UsecaseError {
    fn from(rejection: JsonRejection) -> Self {
        UsecaseError::Validation(rejection.body_text())
    }
}

impl UsecaseError {
    pub fn status(&self) -> StatusCode {
        match self {
            UsecaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UsecaseError::Validation(_) => StatusCode::BAD_REQUEST,
            UsecaseError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            UsecaseError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            UsecaseError::Conflict(_) => StatusCode::CONFLICT,
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        let body = match &self {
            UsecaseError::Internal(detail) => {
                tracing::error!(error = %self, "internal error");
                json!({ "message": "Internal server error", "error": detail })
            }
            UsecaseError::NotFound(_) => {
                tracing::warn!(error = %self, "resource not found");
                json!({ "message": self.to_string() })
            }
            UsecaseError::Unauthenticated(_) => {
                tracing::warn!(error = %self, "unauthenticated");
                json!({ "message": self.to_string() })
            }
            _ => {
                tracing::debug!(error = %self);
                json!({ "message": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
