//! Argon2 password hashing

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("incorrect password")]
    Mismatch,

    #[error("hashing failed: {0}")]
    Hashing(String),

    /// Stored hash is not a valid PHC string
    #[error("invalid stored hash: {0}")]
    InvalidHash(String),
}

/// Hash with a fresh random salt; returns a PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verify `password` against a stored PHC string
pub fn check_password(password: &str, hashed_password: &str) -> Result<(), PasswordError> {
    let parsed =
        PasswordHash::new(hashed_password).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_check() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(check_password("secret123", &hash).is_ok());
        assert_eq!(
            check_password("wrong-password", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_corrupt_hash() {
        assert!(matches!(
            check_password("secret123", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}
