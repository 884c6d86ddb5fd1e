//! Permission entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::PermissionId;

/// A single grant of `action` on `resource`.
///
/// Stored both as the composite `name` (`"users.read"`) and as the
/// decomposed pair. Either form is accepted when matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: PermissionId,
    /// Composite `resource.action` name.
    pub name: String,
    /// Resource part, e.g. `"users"`.
    pub resource: String,
    /// Action part, e.g. `"read"`.
    pub action: String,
    /// Free-form description.
    pub description: String,
}

impl Permission {
    /// Build the composite name for a resource/action pair.
    pub fn composite_name(resource: &str, action: &str) -> String {
        format!("{resource}.{action}")
    }

    /// Dual-form match: composite name or decomposed pair.
    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.name == Self::composite_name(resource, action)
            || (self.resource == resource && self.action == action)
    }
}
