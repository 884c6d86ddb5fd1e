//! Activity log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::{ActivityLogId, UserId};

/// An append-only record of something a user did.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    /// Unique entry identifier.
    pub id: ActivityLogId,
    /// The acting user. Cleared when the account is deleted; the entry
    /// itself is kept.
    pub user_id: Option<UserId>,
    /// What happened, e.g. `"login"`.
    pub action: String,
    /// What it happened to, e.g. `"auth"`.
    pub resource: String,
    /// Human-readable details.
    pub details: String,
    /// Client IP address, when known.
    pub ip_address: Option<String>,
    /// Client User-Agent, when known.
    pub user_agent: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append an activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityLog {
    /// The acting user.
    pub user_id: UserId,
    /// What happened.
    pub action: String,
    /// What it happened to.
    pub resource: String,
    /// Human-readable details.
    pub details: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
}

impl CreateActivityLog {
    /// Start an entry for `user_id`.
    pub fn new(
        user_id: UserId,
        action: impl Into<String>,
        resource: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource: resource.into(),
            details: details.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach client metadata.
    pub fn with_client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}
