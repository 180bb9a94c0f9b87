use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::domain::user::Principal;
use crate::usecase::error::UsecaseError;
use crate::usecase::jwt::JwtService;
use crate::AppState;

/// Rejects the request with 401 unless it carries a valid bearer token; on
/// success the token's principal is stored in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, UsecaseError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let principal = principal_from_header(&state.jwt_service, auth_header)?;

    tracing::debug!(?principal, "request authenticated");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

pub fn principal_from_header(
    jwt_service: &JwtService,
    auth_header: Option<&str>,
) -> Result<Principal, UsecaseError> {
    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            tracing::warn!("missing or invalid authorization header");
            return Err(UsecaseError::Unauthenticated(
                "Missing or invalid Authorization header".to_string(),
            ));
        }
    };

    let claims = jwt_service.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "invalid token");
        UsecaseError::Unauthenticated(format!("Invalid token: {}", e))
    })?;

    Ok(Principal { email: claims.email })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn jwt() -> JwtService {
        JwtService::new("thisIsSecret".to_string(), 7)
    }

    #[test]
    fn test_valid_bearer_token_yields_principal() {
        let service = jwt();
        let token = service
            .generate_token(Uuid::new_v4(), "simon@example.com", "Simon")
            .unwrap();
        let header = format!("Bearer {}", token);

        let principal = principal_from_header(&service, Some(&header)).unwrap();

        assert_eq!(principal.email, "simon@example.com");
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let result = principal_from_header(&jwt(), None);
        assert!(matches!(result, Err(UsecaseError::Unauthenticated(_))));
    }

    #[test]
    fn test_wrong_scheme_is_unauthenticated() {
        let result = principal_from_header(&jwt(), Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(result, Err(UsecaseError::Unauthenticated(_))));

        let result = principal_from_header(&jwt(), Some("Bearer "));
        assert!(matches!(result, Err(UsecaseError::Unauthenticated(_))));
    }

    #[test]
    fn test_token_from_other_secret_is_unauthenticated() {
        let other = JwtService::new("anotherSecret".to_string(), 7);
        let token = other
            .generate_token(Uuid::new_v4(), "simon@example.com", "Simon")
            .unwrap();
        let header = format!("Bearer {}", token);

        let result = principal_from_header(&jwt(), Some(&header));
        assert!(matches!(result, Err(UsecaseError::Unauthenticated(_))));
    }
}
