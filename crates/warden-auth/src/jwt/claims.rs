//! JWT claims carried by access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::types::UserId;
use warden_entity::role::{Permission, RoleWithPermissions};

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
    /// Token type: `"access"` or `"refresh"`.
    pub token_type: TokenType,
    /// Role snapshot at issuance. Present on access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleSnapshot>,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every API request.
    Access,
    /// Long-lived token exchanged for a fresh pair.
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// One `{resource, action}` grant inside a role snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Resource part.
    pub resource: String,
    /// Action part.
    pub action: String,
}

impl From<&Permission> for PermissionGrant {
    fn from(p: &Permission) -> Self {
        if p.resource.is_empty() && p.action.is_empty() {
            let (resource, action) = p.name.split_once('.').unwrap_or((p.name.as_str(), ""));
            return Self {
                resource: resource.to_string(),
                action: action.to_string(),
            };
        }
        Self {
            resource: p.resource.clone(),
            action: p.action.clone(),
        }
    }
}

/// The role and its grants as they were when an access token was issued.
///
/// Changes to the role after issuance are not visible until the token
/// expires and a new one is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    /// Role name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Vec<PermissionGrant>,
}

impl RoleSnapshot {
    /// Whether the snapshot grants `action` on `resource`, matching either
    /// the composite `resource.action` name or the decomposed pair.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        let wanted = Permission::composite_name(resource, action);
        self.permissions.iter().any(|g| {
            (g.resource == resource && g.action == action)
                || Permission::composite_name(&g.resource, &g.action) == wanted
        })
    }
}

impl From<&RoleWithPermissions> for RoleSnapshot {
    fn from(role: &RoleWithPermissions) -> Self {
        Self {
            name: role.role.name.clone(),
            permissions: role.permissions.iter().map(PermissionGrant::from).collect(),
        }
    }
}
