//! Unified application error types for Warden.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The kind keeps the precise internal
//! cause; deciding how much of it reaches a network caller is the job of
//! the service and API layers.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Login failed. Covers both unknown email and wrong password.
    InvalidCredentials,
    /// The account exists and the password matched, but it is deactivated.
    AccountDeactivated,
    /// A unique field (email, username, role name) is already taken.
    Conflict,
    /// The requested identity, role, permission, or token was not found.
    NotFound,
    /// Generic authentication failure (missing header, unknown principal).
    Authentication,
    /// A bearer token is past its expiry.
    TokenExpired,
    /// A bearer token could not be decoded or its signature is invalid.
    TokenMalformed,
    /// A refresh token was presented where an access token is required, or vice versa.
    TokenWrongKind,
    /// The caller is authenticated but not allowed to perform the action.
    Authorization,
    /// Required seed data or settings are missing.
    Configuration,
    /// Password hashing failed (entropy or resource exhaustion).
    Hashing,
    /// A password-reset token is unknown, expired, or already used.
    ResetTokenInvalid,
    /// Input validation failed.
    Validation,
    /// A database error occurred.
    Database,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether the message of this kind must stay server-side.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Configuration
                | Self::Hashing
                | Self::Database
                | Self::Serialization
                | Self::Internal
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::AccountDeactivated => write!(f, "ACCOUNT_DEACTIVATED"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::TokenMalformed => write!(f, "TOKEN_MALFORMED"),
            Self::TokenWrongKind => write!(f, "TOKEN_WRONG_KIND"),
            Self::Authorization => write!(f, "FORBIDDEN"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Hashing => write!(f, "HASHING"),
            Self::ResetTokenInvalid => write!(f, "INVALID_OR_EXPIRED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Warden.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create the uniform login failure.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid credentials")
    }

    /// Create an account-deactivated error.
    pub fn account_deactivated() -> Self {
        Self::new(ErrorKind::AccountDeactivated, "Account is deactivated")
    }

    /// Create the uniform password-reset failure.
    pub fn reset_token_invalid() -> Self {
        Self::new(ErrorKind::ResetTokenInvalid, "Invalid or expired token")
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization (forbidden) error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create an expired-token error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a malformed-token error.
    pub fn token_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenMalformed, message)
    }

    /// Create a wrong-kind token error.
    pub fn token_wrong_kind(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenWrongKind, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a hashing error.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hashing, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::with_source(ErrorKind::NotFound, "Row not found", err),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let message = match db_err.constraint() {
                    Some(constraint) => format!("Duplicate value violates '{constraint}'"),
                    None => "Duplicate value".to_string(),
                };
                Self::with_source(ErrorKind::Conflict, message, err)
            }
            _ => Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_kind_code() {
        let err = AppError::invalid_credentials();
        assert_eq!(err.to_string(), "INVALID_CREDENTIALS: Invalid credentials");
    }

    #[test]
    fn test_internal_kinds_hide_details() {
        assert!(ErrorKind::Configuration.is_internal());
        assert!(ErrorKind::Database.is_internal());
        assert!(!ErrorKind::ResetTokenInvalid.is_internal());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("disk gone");
        let err = AppError::from(io);
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::Internal);
    }
}
