use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to generate token: {0}")]
    TokenGenerationError(String),
    #[error("Failed to validate token: {0}")]
    TokenValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,  // user id
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtService {
    secret: String,
    token_duration: Duration,
}

impl JwtService {
    pub fn new(secret: String, expiry_days: i64) -> Self {
        Self {
            secret,
            token_duration: Duration::days(expiry_days),
        }
    }

    pub fn generate_token(&self, user_id: Uuid, email: &str, name: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: (now + self.token_duration).timestamp(),
            iat: now.timestamp(),
        };

        jsonwebtoken::encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::TokenGenerationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = true;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::TokenValidationError(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_jwt_service() -> JwtService {
        JwtService::new("test_secret_key_123".to_string(), 7)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = create_test_jwt_service();
        let user_id = Uuid::new_v4();

        let token = service
            .generate_token(user_id, "simon@example.com", "Simon")
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "simon@example.com");
        assert_eq!(claims.name, "Simon");
    }

    #[test]
    fn test_token_expiry_uses_configured_days() {
        let service = create_test_jwt_service();
        let token = service
            .generate_token(Uuid::new_v4(), "simon@example.com", "Simon")
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        let expected_exp = (Utc::now() + Duration::days(7)).timestamp();
        assert!((claims.exp - expected_exp).abs() < 5);
        assert!(claims.iat <= Utc::now().timestamp());
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = create_test_jwt_service();
        let result = service.validate_token("invalid.token.here");

        assert!(matches!(result, Err(JwtError::TokenValidationError(_))));
    }

    #[test]
    fn test_validate_token_with_wrong_secret() {
        let issuer = JwtService::new("secret1".to_string(), 7);
        let verifier = JwtService::new("secret2".to_string(), 7);

        let token = issuer
            .generate_token(Uuid::new_v4(), "simon@example.com", "Simon")
            .unwrap();

        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new("secret".to_string(), -1);
        let token = service
            .generate_token(Uuid::new_v4(), "simon@example.com", "Simon")
            .unwrap();

        assert!(matches!(service.validate_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_token_signed_with_other_algorithm_is_rejected() {
        let service = create_test_jwt_service();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "simon@example.com".to_string(),
            name: "Simon".to_string(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_123"),
        )
        .unwrap();

        assert!(service.validate_token(&token).is_err());
    }
}
