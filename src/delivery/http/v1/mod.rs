pub mod auth;
pub mod locations;
pub mod middleware;
pub mod reviews;

use axum::Json;
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::usecase::error::UsecaseError;

/// JSON request body whose rejections answer 400 with the usual error body.
pub(crate) type JsonBody<T> = WithRejection<Json<T>, UsecaseError>;

/// Ids that are not well-formed cannot name an existing resource, so they
/// are reported as not found rather than as a bad request.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, UsecaseError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!(%raw, what, "malformed id in path");
        UsecaseError::NotFound(what.to_string())
    })
}

pub(crate) fn validation_error(errors: validator::ValidationErrors) -> UsecaseError {
    tracing::warn!(?errors, "validation failed");
    UsecaseError::Validation(format!("Validation error: {}", errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Location").unwrap(), id);

        let err = parse_id("5a1b2c", "Location").unwrap_err();
        assert_eq!(err.to_string(), "Location not found");
    }
}
