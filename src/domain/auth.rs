use crate::error::{AppError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, SaltString},
};
use rand::rngs::OsRng;

/// Argon2 output and salt, stored in separate columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: String,
    pub salt: String,
}

impl PasswordDigest {
    /// Hashes `password` with a freshly generated salt.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if hashing fails.
    pub fn derive(password: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = compute(password, &salt)?;
        Ok(Self { hash: hash.to_string(), salt: salt.as_str().to_string() })
    }

    /// Checks `password` against a stored hash and salt.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the stored values are malformed.
    pub fn verify(password: &str, hash: &str, salt: &str) -> Result<bool> {
        let salt = SaltString::from_b64(salt).map_err(|_| AppError::Internal)?;
        let expected = argon2::password_hash::Output::b64_decode(hash).map_err(|_| AppError::Internal)?;
        let actual = compute(password, &salt)?;
        // Output's PartialEq is constant-time.
        Ok(actual == expected)
    }
}

fn compute(password: &str, salt: &SaltString) -> Result<argon2::password_hash::Output> {
    let parsed: PasswordHash<'_> =
        Argon2::default().hash_password(password.as_bytes(), salt).map_err(|_| AppError::Internal)?;
    parsed.hash.ok_or(AppError::Internal)
}
