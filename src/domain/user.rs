use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email),
            name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Identity taken from a verified bearer token. Only the email claim is
/// trusted for looking the user up.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub email: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
