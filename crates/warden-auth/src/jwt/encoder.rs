//! JWT token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::UserId;

use super::claims::{Claims, RoleSnapshot, TokenType};

/// Creates signed HS256 access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.jwt_refresh_ttl_hours as i64),
        }
    }

    /// Issue an access token carrying `role`.
    pub fn access_token(
        &self,
        user_id: UserId,
        role: &RoleSnapshot,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue(user_id, TokenType::Access, self.access_ttl, Some(role.clone()))
    }

    /// Issue a refresh token. It carries no authorization payload.
    pub fn refresh_token(&self, user_id: UserId) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue(user_id, TokenType::Refresh, self.refresh_ttl, None)
    }

    fn issue(
        &self,
        user_id: UserId,
        token_type: TokenType,
        ttl: Duration,
        role: Option<RoleSnapshot>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
            role,
        };
        Ok((self.sign(&claims)?, exp))
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            AppError::internal(format!("Failed to encode {} token: {e}", claims.token_type))
        })
    }
}
