//! Role administration and permission listings.
//!
//! System roles keep their names and cannot be deleted; their grants may
//! still be edited.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{PermissionId, RoleId};
use warden_database::Stores;
use warden_database::store::{ActivityLogStore, RoleStore};
use warden_entity::activity::CreateActivityLog;
use warden_entity::role::{CreateRole, Permission, Role, RoleWithPermissions, UpdateRole};

use crate::activity;
use crate::context::RequestContext;

/// New role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

/// Lists, creates, edits, and deletes roles.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleStore>,
    activity: Arc<dyn ActivityLogStore>,
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService").finish_non_exhaustive()
    }
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(stores: &Stores) -> Self {
        Self {
            roles: stores.roles.clone(),
            activity: stores.activity.clone(),
        }
    }

    /// Every role with its permissions.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleWithPermissions>> {
        self.roles.list_with_permissions().await
    }

    /// Every permission.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.roles.list_permissions().await
    }

    /// One role with its permissions.
    pub async fn get_role(&self, id: RoleId) -> AppResult<RoleWithPermissions> {
        self.roles
            .find_with_permissions(id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }

    /// Permissions of one role.
    pub async fn role_permissions(&self, id: RoleId) -> AppResult<Vec<Permission>> {
        Ok(self.get_role(id).await?.permissions)
    }

    /// Create a custom (non-system) role.
    pub async fn create_role(
        &self,
        ctx: &RequestContext,
        input: CreateRoleInput,
    ) -> AppResult<RoleWithPermissions> {
        let name = normalize_name(&input.name)?;
        if self.roles.find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("Role with this name already exists"));
        }
        let permission_ids = self.known_permissions(&input.permission_ids).await?;

        let role = self
            .roles
            .create(&CreateRole {
                name,
                description: input.description.trim().to_string(),
                permission_ids,
            })
            .await?;

        self.record(ctx, "create", format!("Role '{}' created", role.role.name)).await;
        info!(actor = %ctx.user_id, role = %role.role.name, "Role created");
        Ok(role)
    }

    /// Partial update. A present `permission_ids` replaces every grant.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        id: RoleId,
        mut changes: UpdateRole,
    ) -> AppResult<RoleWithPermissions> {
        let role = self.find(id).await?;

        if let Some(name) = changes.name.take() {
            let name = normalize_name(&name)?;
            if name != role.name {
                if role.is_system_role {
                    return Err(AppError::validation("Cannot change system role name"));
                }
                if self.roles.find_by_name(&name).await?.is_some() {
                    return Err(AppError::conflict("Role with this name already exists"));
                }
                changes.name = Some(name);
            }
        }
        if let Some(description) = changes.description.as_mut() {
            *description = description.trim().to_string();
        }
        if let Some(ids) = changes.permission_ids.take() {
            changes.permission_ids = Some(self.known_permissions(&ids).await?);
        }

        let updated = self
            .roles
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))?;

        self.record(ctx, "update", format!("Role '{}' updated", updated.role.name)).await;
        info!(actor = %ctx.user_id, role = %updated.role.name, "Role updated");
        Ok(updated)
    }

    /// Replace every grant of a role.
    pub async fn assign_permissions(
        &self,
        ctx: &RequestContext,
        id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<RoleWithPermissions> {
        let changes = UpdateRole {
            permission_ids: Some(permission_ids.to_vec()),
            ..UpdateRole::default()
        };
        self.update_role(ctx, id, changes).await
    }

    /// Delete a custom role nobody holds.
    pub async fn delete_role(&self, ctx: &RequestContext, id: RoleId) -> AppResult<()> {
        let role = self.find(id).await?;
        if role.is_system_role {
            return Err(AppError::validation("Cannot delete system role"));
        }
        if !self.roles.delete(id).await? {
            return Err(AppError::not_found("Role not found"));
        }

        self.record(ctx, "delete", format!("Role '{}' deleted", role.name)).await;
        info!(actor = %ctx.user_id, role = %role.name, "Role deleted");
        Ok(())
    }

    async fn find(&self, id: RoleId) -> AppResult<Role> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }

    /// Deduplicated ids, all of which must exist.
    async fn known_permissions(&self, ids: &[PermissionId]) -> AppResult<Vec<PermissionId>> {
        let ids: Vec<PermissionId> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(ids);
        }
        let found = self.roles.find_permissions(&ids).await?;
        if found.len() != ids.len() {
            return Err(AppError::validation("Some permissions not found"));
        }
        Ok(ids)
    }

    async fn record(&self, ctx: &RequestContext, action: &str, details: String) {
        activity::record(
            self.activity.as_ref(),
            CreateActivityLog::new(ctx.user_id, action, "roles", details)
                .with_client(ctx.ip_address.clone(), ctx.user_agent.clone()),
        )
        .await;
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Role name is required"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::ErrorKind;

    use crate::testing::Fixture;

    async fn permission_ids(svc: &RoleService, names: &[&str]) -> Vec<PermissionId> {
        svc.list_permissions()
            .await
            .expect("perms")
            .into_iter()
            .filter(|p| names.contains(&p.name.as_str()))
            .map(|p| p.id)
            .collect()
    }

    #[tokio::test]
    async fn test_listings() {
        let f = Fixture::new();
        let svc = RoleService::new(&f.stores);
        let roles = svc.list_roles().await.expect("roles");
        assert_eq!(roles.len(), 4);
        assert_eq!(svc.list_permissions().await.expect("perms").len(), 11);

        let user_role = roles.iter().find(|r| r.role.name == "User").expect("user role");
        let perms = svc.role_permissions(user_role.role.id).await.expect("perms");
        assert_eq!(perms.len(), 1);
        assert_eq!(perms[0].name, "dashboard.read");
    }

    #[tokio::test]
    async fn test_unknown_role() {
        let f = Fixture::new();
        let err = RoleService::new(&f.stores)
            .role_permissions(RoleId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_update_delete_custom_role() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let ctx = f.ctx(root).await;
        let svc = RoleService::new(&f.stores);

        let grants = permission_ids(&svc, &["users.read", "dashboard.read"]).await;
        let role = svc
            .create_role(
                &ctx,
                CreateRoleInput {
                    name: "  Auditor ".to_string(),
                    description: "Reads things".to_string(),
                    permission_ids: grants,
                },
            )
            .await
            .expect("create");
        assert_eq!(role.role.name, "Auditor");
        assert!(!role.role.is_system_role);
        assert!(role.allows("users", "read"));

        let updated = svc
            .update_role(
                &ctx,
                role.role.id,
                UpdateRole {
                    name: Some("Reviewer".to_string()),
                    permission_ids: Some(permission_ids(&svc, &["roles.read"]).await),
                    ..UpdateRole::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.role.name, "Reviewer");
        assert_eq!(updated.role.description, "Reads things");
        assert!(!updated.allows("users", "read"));
        assert!(updated.allows("roles", "read"));

        svc.delete_role(&ctx, role.role.id).await.expect("delete");
        let err = svc.get_role(role.role.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let entries = f.memory.recent(10).await.expect("activity");
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.resource == "roles"));
    }

    #[tokio::test]
    async fn test_name_conflicts_and_unknown_permissions() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let ctx = f.ctx(root).await;
        let svc = RoleService::new(&f.stores);

        let err = svc
            .create_role(
                &ctx,
                CreateRoleInput {
                    name: "Manager".to_string(),
                    description: String::new(),
                    permission_ids: vec![],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = svc
            .create_role(
                &ctx,
                CreateRoleInput {
                    name: "Auditor".to_string(),
                    description: String::new(),
                    permission_ids: vec![PermissionId::new()],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_system_roles_are_guarded() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let ctx = f.ctx(root).await;
        let svc = RoleService::new(&f.stores);
        let manager = svc
            .list_roles()
            .await
            .expect("roles")
            .into_iter()
            .find(|r| r.role.name == "Manager")
            .expect("manager");

        let err = svc
            .update_role(
                &ctx,
                manager.role.id,
                UpdateRole {
                    name: Some("Lead".to_string()),
                    ..UpdateRole::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = svc.delete_role(&ctx, manager.role.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        // Grants of a system role may still change.
        let updated = svc
            .assign_permissions(&ctx, manager.role.id, &permission_ids(&svc, &["users.read"]).await)
            .await
            .expect("assign");
        assert_eq!(updated.permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_role_in_use_is_not_deleted() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let role = f.memory.insert_role("Auditor", &[]).await;
        let holder = f.user("User", "uma", "password1").await;
        assert!(f.memory.assign_role(holder, role.id).await);

        let err = RoleService::new(&f.stores)
            .delete_role(&f.ctx(root).await, role.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
