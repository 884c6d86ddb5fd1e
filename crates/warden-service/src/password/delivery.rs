//! Hand-off point for getting a reset token to its owner.

use async_trait::async_trait;
use tracing::warn;

use warden_core::result::AppResult;
use warden_entity::user::User;

/// Delivers a freshly issued reset token out of band (email, SMS, ...).
#[async_trait]
pub trait ResetDelivery: Send + Sync + 'static {
    /// Send `token` to `user`.
    async fn deliver(&self, user: &User, token: &str) -> AppResult<()>;
}

/// Drops tokens. Used until a real delivery channel is configured.
#[derive(Debug, Clone, Default)]
pub struct DiscardDelivery;

#[async_trait]
impl ResetDelivery for DiscardDelivery {
    async fn deliver(&self, user: &User, _token: &str) -> AppResult<()> {
        warn!(user_id = %user.id, "No reset delivery channel configured; token discarded");
        Ok(())
    }
}
