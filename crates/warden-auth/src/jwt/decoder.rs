//! JWT token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates HS256 tokens: signature, expiry (with leeway), and kind.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.jwt_leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes an access token. Access tokens must carry a role snapshot.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_kind(token, TokenType::Access)?;
        if claims.role.is_none() {
            return Err(AppError::token_malformed("Access token is missing its role"));
        }
        Ok(claims)
    }

    /// Decodes a refresh token.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_kind(token, TokenType::Refresh)
    }

    fn decode_kind(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::token_expired("Token has expired"),
                JwtErrorKind::InvalidSignature => {
                    AppError::token_malformed("Invalid token signature")
                }
                _ => {
                    debug!(error = %e, "Rejected undecodable token");
                    AppError::token_malformed("Invalid token")
                }
            })?
            .claims;

        if claims.token_type != expected {
            return Err(AppError::token_wrong_kind(format!(
                "Invalid token type: expected {expected} token"
            )));
        }
        Ok(claims)
    }
}
