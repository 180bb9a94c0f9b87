use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validation_error, JsonBody};
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling register request");

    payload.validate().map_err(validation_error)?;

    let token = state
        .auth_usecase
        .register(payload.name, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling login request");

    payload.validate().map_err(validation_error)?;

    let token = state
        .auth_usecase
        .login(payload.email, payload.password)
        .await?;

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"name": "Simon", "email": "simon@example.com", "password": "correct horse"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let request: RegisterRequest = serde_json::from_str(
            r#"{"name": "Simon", "email": "not-an-email", "password": "correct horse"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: RegisterRequest = serde_json::from_str(
            r#"{"name": "Simon", "email": "simon@example.com", "password": "short"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: RegisterRequest =
            serde_json::from_str(r#"{"email": "simon@example.com", "password": "correct horse"}"#)
                .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_requires_both_fields() {
        let request: LoginRequest = serde_json::from_str(r#"{"email": "simon@example.com"}"#).unwrap();
        assert!(request.validate().is_err());

        let request: LoginRequest =
            serde_json::from_str(r#"{"email": "simon@example.com", "password": "x"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_token_response_shape() {
        let json = serde_json::to_value(TokenResponse {
            token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"token": "abc"}));
    }
}
