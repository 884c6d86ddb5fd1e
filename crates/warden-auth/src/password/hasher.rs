//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use warden_core::error::{AppError, ErrorKind};

/// Well-formed hash with the default Argon2id parameters. Verifying
/// against it costs the same as verifying a real account's hash.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    ///
    /// The full input is hashed; nothing is truncated.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::hashing(format!("Password hashing failed: {e}")))
    }

    /// Verifies a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            AppError::new(ErrorKind::Hashing, format!("Invalid password hash format: {e}"))
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::hashing(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Burn one verification's worth of CPU for a login whose account
    /// does not exist. Always `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        self.verify_password(password, DUMMY_HASH).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify_password("wrong horse", &hash).expect("verify"));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash_password("same").expect("hash");
        let b = hasher.hash_password("same").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_input_not_truncated() {
        let hasher = PasswordHasher::new();
        let long = "x".repeat(200);
        let hash = hasher.hash_password(&long).expect("hash");
        let mut almost = long.clone();
        almost.push('y');
        assert!(!hasher.verify_password(&almost, &hash).expect("verify"));
    }

    #[test]
    fn test_dummy_hash_is_well_formed() {
        assert!(PasswordHash::new(DUMMY_HASH).is_ok());
        assert!(!PasswordHasher::new().verify_dummy("anything"));
    }

    #[test]
    fn test_garbage_hash_is_error() {
        let err = PasswordHasher::new()
            .verify_password("pw", "not-a-phc-string")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Hashing);
    }
}
