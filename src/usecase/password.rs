use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Argon2id hash in PHC string format, salted per call.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// `Ok(false)` means a wrong password; `Err` means the stored hash is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2() {
        let hash = hash_password("coffee_lover").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, "coffee_lover");
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(
            hash_password("same_password").unwrap(),
            hash_password("same_password").unwrap()
        );
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_with_malformed_hash() {
        let result = verify_password("anything", "not_a_valid_hash");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}
