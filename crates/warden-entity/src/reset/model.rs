//! Password-reset token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::{ResetTokenId, UserId};

/// A single-use credential that authorizes one password change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    /// Unique row identifier.
    pub id: ResetTokenId,
    /// The account this token resets.
    pub user_id: UserId,
    /// Opaque random token value.
    #[serde(skip_serializing, default)]
    pub token: String,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
    /// The token stops working at this instant.
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Whether the token is still usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Data required to persist a new reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResetToken {
    /// The account this token resets.
    pub user_id: UserId,
    /// Opaque random token value.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let token = PasswordResetToken {
            id: ResetTokenId::new(),
            user_id: UserId::new(),
            token: "abc".to_string(),
            created_at: now - Duration::hours(1),
            expires_at: now,
        };
        assert!(!token.is_valid_at(now));
        assert!(token.is_valid_at(now - Duration::seconds(1)));
    }
}
