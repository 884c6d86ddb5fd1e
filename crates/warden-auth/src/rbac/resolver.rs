//! Store-backed permission resolution.

use std::sync::Arc;

use tracing::debug;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_database::store::UserStore;
use warden_entity::role::{Permission, RoleWithPermissions};

use super::hierarchy::RoleHierarchy;

/// Answers permission, role, and management questions about users.
///
/// Every call reads the user's current role from the store, so unlike the
/// snapshot in an access token it reflects role changes immediately.
#[derive(Clone)]
pub struct PermissionResolver {
    users: Arc<dyn UserStore>,
    hierarchy: Arc<RoleHierarchy>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver")
            .field("hierarchy", &self.hierarchy)
            .finish_non_exhaustive()
    }
}

impl PermissionResolver {
    /// Creates a resolver over `users` with an injected hierarchy.
    pub fn new(users: Arc<dyn UserStore>, hierarchy: Arc<RoleHierarchy>) -> Self {
        Self { users, hierarchy }
    }

    /// The user's role with permissions. `NotFound` for an unknown user.
    pub async fn get_user_role(&self, user_id: UserId) -> AppResult<RoleWithPermissions> {
        self.users
            .find_with_role(user_id)
            .await?
            .map(|u| u.role)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// All permissions granted through the user's role.
    pub async fn get_user_permissions(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        Ok(self.get_user_role(user_id).await?.permissions)
    }

    /// Whether the user's role grants `action` on `resource`.
    pub async fn check_permission(
        &self,
        user_id: UserId,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        let role = self.get_user_role(user_id).await?;
        let allowed = role.allows(resource, action);
        debug!(
            user_id = %user_id,
            role = %role.role.name,
            resource,
            action,
            allowed,
            "Permission check"
        );
        Ok(allowed)
    }

    /// Exact role-name match.
    pub async fn has_role(&self, user_id: UserId, role_name: &str) -> AppResult<bool> {
        Ok(self.get_user_role(user_id).await?.role.name == role_name)
    }

    /// Whether the user holds any of `role_names`.
    pub async fn has_any_role(&self, user_id: UserId, role_names: &[&str]) -> AppResult<bool> {
        let role = self.get_user_role(user_id).await?;
        Ok(role_names.iter().any(|name| *name == role.role.name))
    }

    /// Whether `manager_id` outranks `target_id`.
    ///
    /// Self-comparison is not special-cased: a user never outranks itself.
    pub async fn can_manage_user(&self, manager_id: UserId, target_id: UserId) -> AppResult<bool> {
        let manager = self.get_user_role(manager_id).await?;
        let target = self.get_user_role(target_id).await?;
        Ok(self.hierarchy.can_manage(&manager.role.name, &target.role.name))
    }

    /// Whether `manager_id` may put someone in the role named `role_name`.
    pub async fn can_assign_role(&self, manager_id: UserId, role_name: &str) -> AppResult<bool> {
        let manager = self.get_user_role(manager_id).await?;
        Ok(self.hierarchy.can_assign(&manager.role.name, role_name))
    }
}
