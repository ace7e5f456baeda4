// Password hashing and verification service

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
///
/// Argon2id is CPU-intensive; async callers go through the `*_async`
/// variants, which run on the blocking thread pool.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored PHC hash string
    ///
    /// The digest comparison inside argon2 is constant-time. A stored hash
    /// that cannot be parsed is an internal error, not a mismatch.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || Self::hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHashError(format!("Task join error: {}", e)))?
    }

    pub async fn verify_password_async(password: String, hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || Self::verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHashError(format!("Task join error: {}", e)))?
    }

    /// Burn one verification against a fixed hash
    ///
    /// Used when the email is unknown so the response time matches a real
    /// password check.
    pub async fn dummy_verify(password: String) {
        let hash = dummy_hash().to_string();
        let _ = Self::verify_password_async(password, hash).await;
    }
}

fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| {
        PasswordService::hash_password("dummy-password-for-timing").unwrap_or_default()
    })
}
