use crate::domain::user::{normalize_email, Principal, User};
use crate::usecase::contracts::UserRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::jwt::JwtService;
use crate::usecase::password::{hash_password, verify_password, MIN_PASSWORD_LEN};

const BAD_CREDENTIALS: &str = "Incorrect email or password";

pub struct AuthUseCase<U>
where
    U: UserRepository,
{
    user_repository: U,
    jwt_service: JwtService,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repository: U, jwt_service: JwtService) -> Self {
        Self {
            user_repository,
            jwt_service,
        }
    }

    /// Maps a token principal to the display name used as review author.
    #[tracing::instrument(skip(self, principal))]
    pub async fn resolve_author(&self, principal: Option<&Principal>) -> Result<String, UsecaseError> {
        let principal = principal.ok_or_else(|| {
            tracing::warn!("author resolution without a principal");
            UsecaseError::Unauthenticated("Authentication required".to_string())
        })?;

        let user = self
            .user_repository
            .find_by_email(&normalize_email(&principal.email))
            .await?
            .ok_or_else(|| UsecaseError::NotFound("User".to_string()))?;

        tracing::debug!(user_id = %user.id, "author resolved");
        Ok(user.name)
    }

    #[tracing::instrument(skip(self, name, email, password))]
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<String, UsecaseError> {
        tracing::debug!("registering user");

        if name.trim().is_empty() {
            return Err(UsecaseError::Validation("Name is required".to_string()));
        }
        let email = normalize_email(&email);
        if !email.contains('@') {
            return Err(UsecaseError::Validation("A valid email is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UsecaseError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.user_repository.find_by_email(&email).await?.is_some() {
            tracing::warn!("registration with an existing email");
            return Err(UsecaseError::Conflict("Email already registered".to_string()));
        }

        let password_hash =
            hash_password(&password).map_err(|e| UsecaseError::Internal(e.to_string()))?;
        let user = User::new(email, name.trim().to_string(), password_hash);
        self.user_repository.create(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.issue_token(&user)
    }

    #[tracing::instrument(skip(self, email, password))]
    pub async fn login(&self, email: String, password: String) -> Result<String, UsecaseError> {
        tracing::debug!("logging in user");

        let user = self
            .user_repository
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or_else(|| UsecaseError::Unauthenticated(BAD_CREDENTIALS.to_string()))?;

        let valid = verify_password(&password, &user.password_hash)
            .map_err(|e| UsecaseError::Internal(e.to_string()))?;
        if !valid {
            tracing::warn!(user_id = %user.id, "wrong password");
            return Err(UsecaseError::Unauthenticated(BAD_CREDENTIALS.to_string()));
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.issue_token(&user)
    }

    fn issue_token(&self, user: &User) -> Result<String, UsecaseError> {
        self.jwt_service
            .generate_token(user.id, &user.email, &user.name)
            .map_err(|e| UsecaseError::Internal(e.to_string()))
    }
}
