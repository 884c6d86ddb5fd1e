//! Role hierarchy configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Rank assigned to one role name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRank {
    /// Exact role name as stored.
    pub role: String,
    /// Higher ranks may manage strictly lower ranks.
    pub rank: u8,
}

impl RoleRank {
    /// Create a new entry.
    pub fn new(role: impl Into<String>, rank: u8) -> Self {
        Self {
            role: role.into(),
            rank,
        }
    }
}

/// RBAC configuration.
///
/// ```toml
/// [rbac]
/// default_role = "User"
///
/// [[rbac.hierarchy]]
/// role = "Super Admin"
/// rank = 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Role assigned to self-registered users.
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Role ranks. Roles not listed have no rank.
    #[serde(default = "default_hierarchy")]
    pub hierarchy: Vec<RoleRank>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            hierarchy: default_hierarchy(),
        }
    }
}

impl RbacConfig {
    /// Reject duplicate role entries and an empty default role.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.default_role.trim().is_empty() {
            return Err(AppError::configuration("rbac.default_role must not be empty"));
        }
        for (i, entry) in self.hierarchy.iter().enumerate() {
            if self.hierarchy[..i].iter().any(|e| e.role == entry.role) {
                return Err(AppError::configuration(format!(
                    "rbac.hierarchy lists role '{}' more than once",
                    entry.role
                )));
            }
        }
        Ok(())
    }
}

fn default_role() -> String {
    "User".to_string()
}

fn default_hierarchy() -> Vec<RoleRank> {
    vec![
        RoleRank::new("Super Admin", 4),
        RoleRank::new("Admin", 3),
        RoleRank::new("Manager", 2),
        RoleRank::new("User", 1),
    ]
}
