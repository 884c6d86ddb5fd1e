//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::{PermissionId, RoleId};

use super::permission::Permission;

/// A named bundle of permissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Unique role name, e.g. `"Super Admin"`.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// System roles cannot be renamed or deleted.
    pub is_system_role: bool,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A role with its permissions eagerly loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    /// The role row.
    #[serde(flatten)]
    pub role: Role,
    /// Permissions granted through `role_permissions`.
    pub permissions: Vec<Permission>,
}

impl RoleWithPermissions {
    /// Whether any permission of this role matches `resource`/`action`.
    pub fn allows(&self, resource: &str, action: &str) -> bool {
        self.permissions.iter().any(|p| p.matches(resource, action))
    }
}

/// Data required to create a custom role. Created roles are never
/// system roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    /// Initial grants.
    pub permission_ids: Vec<PermissionId>,
}

/// Partial update of a role. `None` leaves the field unchanged; a present
/// `permission_ids` replaces every grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<PermissionId>>,
}

/// Number of accounts holding one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoleUserCount {
    pub role_id: RoleId,
    pub role_name: String,
    pub user_count: i64,
}
