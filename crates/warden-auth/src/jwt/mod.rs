//! Access/refresh token issuance and validation.
//!
//! Tokens are stateless: a token is valid while its signature checks out
//! and it has not expired. There is no revocation list.

pub mod claims;
pub mod decoder;
pub mod encoder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::UserId;

pub use claims::{Claims, PermissionGrant, RoleSnapshot, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues and validates both token kinds with one shared secret.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenService {
    /// Creates a token service from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        }
    }

    /// Issue an access token embedding `role`.
    pub fn issue_access_token(
        &self,
        user_id: UserId,
        role: &RoleSnapshot,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        self.encoder.access_token(user_id, role)
    }

    /// Issue a refresh token.
    pub fn issue_refresh_token(&self, user_id: UserId) -> Result<(String, DateTime<Utc>), AppError> {
        self.encoder.refresh_token(user_id)
    }

    /// Issue both tokens.
    pub fn issue_pair(&self, user_id: UserId, role: &RoleSnapshot) -> Result<TokenPair, AppError> {
        let (access_token, access_expires_at) = self.issue_access_token(user_id, role)?;
        let (refresh_token, refresh_expires_at) = self.issue_refresh_token(user_id)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Validate an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decoder.decode_access_token(token)
    }

    /// Validate a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decoder.decode_refresh_token(token)
    }

    #[cfg(test)]
    pub(crate) fn encoder(&self) -> &JwtEncoder {
        &self.encoder
    }
}
