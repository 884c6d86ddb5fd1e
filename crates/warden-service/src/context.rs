//! Request context carrying the authenticated user and its role snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::jwt::RoleSnapshot;
use warden_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built by the API layer from a validated access token and passed into
/// service methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role at the time the access token was issued.
    pub role: RoleSnapshot,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: UserId,
        role: RoleSnapshot,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Whether `id` is the caller.
    pub fn is_self(&self, id: UserId) -> bool {
        self.user_id == id
    }
}
