//! Password policy for newly chosen passwords.

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

/// Length rules applied at registration, reset, and password change.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Minimum number of characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validates a new password.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }

    /// Rejects a new password identical to the current one.
    pub fn validate_not_same(&self, current: &str, new_password: &str) -> Result<(), AppError> {
        if current == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}
