//! Single-use password-reset tokens.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, error, info};

use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_database::Stores;
use warden_database::store::{ResetTokenStore, UserStore};
use warden_entity::reset::CreateResetToken;

use super::delivery::ResetDelivery;

/// Number of random bytes in a reset token.
const TOKEN_BYTES: usize = 32;

/// How long an issued token stays redeemable.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// Issues and redeems password-reset tokens.
#[derive(Clone)]
pub struct PasswordResetService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn ResetTokenStore>,
    hasher: Arc<PasswordHasher>,
    policy: Arc<PasswordPolicy>,
    delivery: Arc<dyn ResetDelivery>,
}

impl std::fmt::Debug for PasswordResetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordResetService").finish_non_exhaustive()
    }
}

impl PasswordResetService {
    /// Creates a new reset service.
    pub fn new(
        stores: &Stores,
        hasher: Arc<PasswordHasher>,
        policy: Arc<PasswordPolicy>,
        delivery: Arc<dyn ResetDelivery>,
    ) -> Self {
        Self {
            users: stores.users.clone(),
            tokens: stores.reset_tokens.clone(),
            hasher,
            policy,
            delivery,
        }
    }

    /// Issue and persist a token for the account owning `email`.
    ///
    /// `NotFound` when no account matches. Callers facing the network
    /// should use [`request_reset`](Self::request_reset) instead.
    pub async fn create_reset_token(&self, email: &str) -> AppResult<String> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("No account for this email"))?;

        let token = generate_token()?;
        let expires_at = Utc::now() + RESET_TOKEN_TTL;
        self.tokens
            .create(&CreateResetToken {
                user_id: user.id,
                token: token.clone(),
                expires_at,
            })
            .await?;

        info!(user_id = %user.id, expires_at = %expires_at, "Password reset token issued");
        self.delivery.deliver(&user, &token).await?;
        Ok(token)
    }

    /// Network-facing reset request. Always succeeds so callers cannot
    /// learn whether an account exists.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        match self.create_reset_token(email).await {
            Ok(_) => {}
            Err(e) if e.is(ErrorKind::NotFound) => {
                debug!("Password reset requested for unknown email");
            }
            Err(e) => {
                error!(error = %e, "Password reset request failed");
            }
        }
        Ok(())
    }

    /// Redeem `token` and set `new_password`.
    ///
    /// Unknown, expired, and already-used tokens fail identically. The
    /// lookup, password update, and token removal happen in one store call,
    /// so a token is consumed at most once even under concurrent requests.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        self.policy.validate(new_password)?;
        let password_hash = self.hasher.hash_password(new_password)?;

        let user_id = self
            .tokens
            .redeem(token, Utc::now(), &password_hash)
            .await?
            .ok_or_else(AppError::reset_token_invalid)?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Delete every expired token. Returns the number removed.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let removed = self.tokens.delete_expired(Utc::now()).await?;
        info!(removed, "Expired reset tokens swept");
        Ok(removed)
    }
}

fn generate_token() -> AppResult<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::internal(format!("OS random source failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
