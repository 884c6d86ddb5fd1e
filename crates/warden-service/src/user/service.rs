//! User administration: listing, creation, updates, activation, deletion,
//! bulk actions, and password changes.
//!
//! Route-level permission checks happen in the API middleware. The checks
//! here are the ones that depend on who the target is: self-protection and
//! the role hierarchy.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_auth::rbac::PermissionResolver;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_core::types::{RoleId, UserId};
use warden_database::Stores;
use warden_database::store::{ActivityLogStore, RoleStore, UserStore};
use warden_entity::activity::{ActivityLog, CreateActivityLog};
use warden_entity::role::Role;
use warden_entity::user::{CreateUser, UpdateUser, User, UserQuery, UserWithRole};

use crate::activity;
use crate::context::RequestContext;

/// Administrator-created account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    /// Email address; stored lowercased.
    pub email: String,
    pub username: String,
    /// Plaintext password, checked against the password policy.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
}

/// Edits a user may make to their own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<ProfileUpdate> for UpdateUser {
    fn from(p: ProfileUpdate) -> Self {
        Self {
            email: p.email,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            ..Self::default()
        }
    }
}

/// Operation applied to every account in a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

impl BulkAction {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Delete => "delete",
        }
    }
}

/// Outcome of a bulk action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkActionResult {
    pub action: BulkAction,
    /// Distinct ids in the request.
    pub requested: u64,
    /// Accounts actually changed; unknown ids are skipped.
    pub affected: u64,
}

/// Handles user administration and the caller's own account.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    activity: Arc<dyn ActivityLogStore>,
    resolver: Arc<PermissionResolver>,
    hasher: Arc<PasswordHasher>,
    policy: Arc<PasswordPolicy>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        stores: &Stores,
        resolver: Arc<PermissionResolver>,
        hasher: Arc<PasswordHasher>,
        policy: Arc<PasswordPolicy>,
    ) -> Self {
        Self {
            users: stores.users.clone(),
            roles: stores.roles.clone(),
            activity: stores.activity.clone(),
            resolver,
            hasher,
            policy,
        }
    }

    /// A user with role and permissions.
    pub async fn get_user(&self, id: UserId) -> AppResult<UserWithRole> {
        self.users
            .find_with_role(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// A filtered, sorted page of users.
    pub async fn list_users(&self, query: &UserQuery) -> AppResult<PageResponse<UserWithRole>> {
        self.users.list(query).await
    }

    /// Create an account on someone else's behalf.
    ///
    /// The caller must be allowed to hand out the requested role.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> AppResult<UserWithRole> {
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_string();
        self.policy.validate(&input.password)?;

        let role = self.assignable_role(ctx, input.role_id).await?;
        if self.users.exists_by_email_or_username(&email, &username).await? {
            return Err(AppError::conflict(
                "User with this email or username already exists",
            ));
        }

        let password_hash = self.hasher.hash_password(&input.password)?;
        let user = self
            .users
            .create(&CreateUser {
                email,
                username,
                password_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                role_id: role.id,
            })
            .await?;

        self.record(ctx, "create", format!("User {} created with role {}", user.id, role.name))
            .await;
        info!(actor = %ctx.user_id, user_id = %user.id, role = %role.name, "User created");
        self.get_user(user.id).await
    }

    /// Partial update of an account.
    ///
    /// Other accounts must be outranked. Callers may edit their own profile
    /// fields but never their own role or status.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        id: UserId,
        mut changes: UpdateUser,
    ) -> AppResult<UserWithRole> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        if ctx.is_self(id) {
            if changes.changes_access() {
                return Err(AppError::validation(
                    "Cannot change your own role or account status",
                ));
            }
        } else {
            self.ensure_can_manage(ctx, id).await?;
        }
        if let Some(role_id) = changes.role_id {
            self.assignable_role(ctx, role_id).await?;
        }
        if let Some(email) = changes.email.as_mut() {
            *email = email.trim().to_lowercase();
        }
        if let Some(username) = changes.username.as_mut() {
            *username = username.trim().to_string();
        }

        self.users
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        self.record(ctx, "update", format!("User {id} updated")).await;
        info!(actor = %ctx.user_id, target = %id, "User updated");
        self.get_user(id).await
    }

    /// Update the caller's own profile.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        changes: ProfileUpdate,
    ) -> AppResult<UserWithRole> {
        self.update_user(ctx, ctx.user_id, changes.into()).await
    }

    /// Activate, deactivate, or delete many accounts at once.
    ///
    /// The caller's own id is rejected and every known target must be
    /// outranked; otherwise nothing is changed.
    pub async fn bulk_action(
        &self,
        ctx: &RequestContext,
        action: BulkAction,
        ids: &[UserId],
    ) -> AppResult<BulkActionResult> {
        let ids: Vec<UserId> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Err(AppError::validation("No user IDs provided"));
        }
        if ids.iter().any(|id| ctx.is_self(*id)) {
            return Err(AppError::validation(
                "Bulk actions cannot include your own account",
            ));
        }
        for id in &ids {
            if self.users.find_by_id(*id).await?.is_some()
                && !self.resolver.can_manage_user(ctx.user_id, *id).await?
            {
                return Err(AppError::forbidden(format!("Cannot manage user {id}")));
            }
        }

        let affected = match action {
            BulkAction::Activate => self.users.set_active_many(&ids, true).await?,
            BulkAction::Deactivate => self.users.set_active_many(&ids, false).await?,
            BulkAction::Delete => self.users.delete_many(&ids).await?,
        };

        self.record(
            ctx,
            action.as_str(),
            format!("Bulk {}: {affected} of {} users", action.as_str(), ids.len()),
        )
        .await;
        info!(actor = %ctx.user_id, action = action.as_str(), affected, "Bulk user action");
        Ok(BulkActionResult {
            action,
            requested: ids.len() as u64,
            affected,
        })
    }

    /// Activate or deactivate another account.
    pub async fn set_active(&self, ctx: &RequestContext, id: UserId, active: bool) -> AppResult<User> {
        if ctx.is_self(id) {
            return Err(AppError::validation("Cannot change your own account status"));
        }
        self.ensure_can_manage(ctx, id).await?;

        let user = self
            .users
            .set_active(id, active)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let action = if active { "activate" } else { "deactivate" };
        self.record(ctx, action, format!("User {id} {action}d")).await;
        info!(actor = %ctx.user_id, target = %id, active, "User status changed");
        Ok(user)
    }

    /// Delete another user's account.
    pub async fn delete_user(&self, ctx: &RequestContext, id: UserId) -> AppResult<()> {
        if ctx.is_self(id) {
            return Err(AppError::validation("Cannot delete your own account"));
        }
        self.ensure_can_manage(ctx, id).await?;

        if !self.users.delete(id).await? {
            return Err(AppError::not_found("User not found"));
        }

        self.record(ctx, "delete", format!("User {id} deleted")).await;
        info!(actor = %ctx.user_id, target = %id, "User deleted");
        Ok(())
    }

    /// Change the caller's own password after verifying the current one.
    pub async fn change_own_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !self.hasher.verify_password(current_password, &user.password_hash)? {
            return Err(AppError::authentication("Current password is incorrect"));
        }

        self.policy.validate(new_password)?;
        self.policy.validate_not_same(current_password, new_password)?;

        let new_hash = self.hasher.hash_password(new_password)?;
        self.users.update_password(ctx.user_id, &new_hash).await?;

        info!(user_id = %ctx.user_id, "Password changed");
        Ok(())
    }

    /// Set a user's password. For the caller's own account the current
    /// password is required; for anyone else the caller must outrank them.
    pub async fn set_password(
        &self,
        ctx: &RequestContext,
        id: UserId,
        current_password: Option<&str>,
        new_password: &str,
    ) -> AppResult<()> {
        if ctx.is_self(id) {
            let current = current_password
                .ok_or_else(|| AppError::validation("Current password is required"))?;
            return self.change_own_password(ctx, current, new_password).await;
        }

        self.ensure_can_manage(ctx, id).await?;
        self.policy.validate(new_password)?;

        let new_hash = self.hasher.hash_password(new_password)?;
        self.users.update_password(id, &new_hash).await?;

        info!(actor = %ctx.user_id, target = %id, "Password set by administrator");
        Ok(())
    }

    /// A user's activity, newest first.
    pub async fn activity(
        &self,
        id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLog>> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }
        self.activity.find_by_user(id, page).await
    }

    async fn assignable_role(&self, ctx: &RequestContext, role_id: RoleId) -> AppResult<Role> {
        let role = self
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))?;
        if !self.resolver.can_assign_role(ctx.user_id, &role.name).await? {
            return Err(AppError::forbidden(format!("Cannot assign role '{}'", role.name)));
        }
        Ok(role)
    }

    async fn record(&self, ctx: &RequestContext, action: &str, details: String) {
        activity::record(
            self.activity.as_ref(),
            CreateActivityLog::new(ctx.user_id, action, "users", details)
                .with_client(ctx.ip_address.clone(), ctx.user_agent.clone()),
        )
        .await;
    }

    async fn ensure_can_manage(&self, ctx: &RequestContext, target: UserId) -> AppResult<()> {
        if self.users.find_by_id(target).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }
        if !self.resolver.can_manage_user(ctx.user_id, target).await? {
            return Err(AppError::forbidden("Cannot manage this user"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::ErrorKind;

    use crate::testing::Fixture;

    fn service(f: &Fixture) -> UserService {
        UserService::new(&f.stores, f.resolver.clone(), f.hasher.clone(), f.policy.clone())
    }

    #[tokio::test]
    async fn test_admin_cannot_deactivate_super_admin() {
        let f = Fixture::new();
        let admin = f.user("Admin", "ann", "password1").await;
        let root = f.user("Super Admin", "root", "password1").await;
        let svc = service(&f);

        let err = svc
            .set_active(&f.ctx(admin).await, root, false)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let user = svc
            .set_active(&f.ctx(root).await, admin, false)
            .await
            .expect("deactivate");
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn test_no_self_status_change_or_delete() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let ctx = f.ctx(root).await;
        let svc = service(&f);

        let err = svc.set_active(&ctx, root, false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = svc.delete_user(&ctx, root).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_reactivate_self() {
        let f = Fixture::new();
        let admin = f.user("Admin", "ann", "password1").await;
        let manager = f.user("Manager", "mia", "password1").await;
        let svc = service(&f);
        // Context built while still active, as from a token issued earlier.
        let stale = f.ctx(manager).await;

        svc.set_active(&f.ctx(admin).await, manager, false)
            .await
            .expect("deactivate");
        let err = svc.set_active(&stale, manager, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let stored = UserStore::find_by_id(&f.memory, manager).await.expect("find").expect("user");
        assert!(!stored.is_active);
    }

    async fn role_id(f: &Fixture, name: &str) -> RoleId {
        RoleStore::find_by_name(&f.memory, name)
            .await
            .expect("lookup")
            .expect("role")
            .id
    }

    fn new_user(username: &str, role_id: RoleId) -> CreateUserInput {
        CreateUserInput {
            email: format!("{username}@Example.com"),
            username: username.to_string(),
            password: "password123".to_string(),
            first_name: "New".to_string(),
            last_name: "Person".to_string(),
            role_id,
        }
    }

    #[tokio::test]
    async fn test_create_user_respects_rank() {
        let f = Fixture::new();
        let admin = f.user("Admin", "ann", "password1").await;
        let ctx = f.ctx(admin).await;
        let svc = service(&f);

        let manager_role = role_id(&f, "Manager").await;
        let created = svc
            .create_user(&ctx, new_user("max", manager_role))
            .await
            .expect("create");
        assert_eq!(created.role_name(), "Manager");
        assert_eq!(created.user.email, "max@example.com");

        let err = svc
            .create_user(&ctx, new_user("amy", role_id(&f, "Admin").await))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = svc
            .create_user(&ctx, new_user("max", manager_role))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = svc
            .create_user(&ctx, new_user("rex", RoleId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_unranked_role_is_never_assigned() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let user = f.user("User", "uma", "password1").await;
        let auditor = f.memory.insert_role("Auditor", &["users.read"]).await;
        let ctx = f.ctx(root).await;
        let svc = service(&f);

        let err = svc
            .create_user(&ctx, new_user("max", auditor.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = svc
            .update_user(
                &ctx,
                user,
                UpdateUser {
                    role_id: Some(auditor.id),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        // The target stayed in a ranked role, so it is still manageable.
        let stored = svc.set_active(&ctx, user, false).await.expect("deactivate");
        assert!(!stored.is_active);
        assert!(RoleStore::delete(&f.memory, auditor.id).await.expect("delete role"));
    }

    #[tokio::test]
    async fn test_update_user_rules() {
        let f = Fixture::new();
        let admin = f.user("Admin", "ann", "password1").await;
        let user = f.user("User", "uma", "password1").await;
        let ctx = f.ctx(admin).await;
        let svc = service(&f);

        let updated = svc
            .update_user(
                &ctx,
                user,
                UpdateUser {
                    first_name: Some("Uma".to_string()),
                    role_id: Some(role_id(&f, "Manager").await),
                    ..UpdateUser::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.user.first_name, "Uma");
        assert_eq!(updated.role_name(), "Manager");

        let err = svc
            .update_user(&ctx, user, UpdateUser::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc
            .update_user(
                &ctx,
                admin,
                UpdateUser {
                    role_id: Some(role_id(&f, "Super Admin").await),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_profile_edits_own_fields() {
        let f = Fixture::new();
        let id = f.user("User", "uma", "password1").await;
        let other = f.user("User", "ulf", "password1").await;
        let ctx = f.ctx(id).await;
        let svc = service(&f);

        let updated = svc
            .update_profile(
                &ctx,
                ProfileUpdate {
                    last_name: Some("Renamed".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .expect("profile");
        assert_eq!(updated.user.last_name, "Renamed");
        assert_eq!(updated.role_name(), "User");

        let err = svc
            .update_user(
                &ctx,
                other,
                UpdateUser {
                    first_name: Some("x".to_string()),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_bulk_actions() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let a = f.user("User", "uma", "password1").await;
        let b = f.user("Manager", "mia", "password1").await;
        let ctx = f.ctx(root).await;
        let svc = service(&f);

        let result = svc
            .bulk_action(&ctx, BulkAction::Deactivate, &[a, b, a, UserId::new()])
            .await
            .expect("bulk");
        assert_eq!(result.requested, 3);
        assert_eq!(result.affected, 2);

        let err = svc.bulk_action(&ctx, BulkAction::Delete, &[]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = svc
            .bulk_action(&ctx, BulkAction::Delete, &[a, root])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let result = svc.bulk_action(&ctx, BulkAction::Delete, &[a]).await.expect("bulk");
        assert_eq!(result.affected, 1);
        assert!(UserStore::find_by_id(&f.memory, a).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn test_bulk_action_needs_rank_over_every_target() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let peer = f.user("Super Admin", "sam", "password1").await;
        let user = f.user("User", "uma", "password1").await;

        let err = service(&f)
            .bulk_action(&f.ctx(root).await, BulkAction::Deactivate, &[user, peer])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let stored = UserStore::find_by_id(&f.memory, user).await.expect("find").expect("user");
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_equal_rank_cannot_delete() {
        let f = Fixture::new();
        let a = f.user("Admin", "ann", "password1").await;
        let b = f.user("Admin", "bob", "password1").await;
        let err = service(&f).delete_user(&f.ctx(a).await, b).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_delete_unknown_user() {
        let f = Fixture::new();
        let root = f.user("Super Admin", "root", "password1").await;
        let err = service(&f)
            .delete_user(&f.ctx(root).await, UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_change_own_password_checks_current() {
        let f = Fixture::new();
        let id = f.user("User", "uma", "password1").await;
        let ctx = f.ctx(id).await;
        let svc = service(&f);

        let err = svc
            .change_own_password(&ctx, "wrong", "password2")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = svc.set_password(&ctx, id, None, "password2").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        svc.set_password(&ctx, id, Some("password1"), "password2")
            .await
            .expect("change");
    }

    #[tokio::test]
    async fn test_manager_sets_user_password() {
        let f = Fixture::new();
        let manager = f.user("Manager", "mia", "password1").await;
        let user = f.user("User", "uma", "password1").await;
        service(&f)
            .set_password(&f.ctx(manager).await, user, None, "fresh-password")
            .await
            .expect("set");

        let stored = UserStore::find_by_id(&f.memory, user).await.expect("find").expect("user");
        assert!(f.hasher.verify_password("fresh-password", &stored.password_hash).expect("verify"));
    }
}
