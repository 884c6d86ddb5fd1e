//! Store traits.
//!
//! Services and the permission resolver depend only on these traits.
//! Lookups return `Ok(None)` for a missing row so callers decide whether
//! absence is an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse};
use warden_core::types::{PermissionId, RoleId, UserId};
use warden_entity::activity::{ActivityLog, CreateActivityLog};
use warden_entity::reset::{CreateResetToken, PasswordResetToken};
use warden_entity::role::{
    CreateRole, Permission, Role, RoleUserCount, RoleWithPermissions, UpdateRole,
};
use warden_entity::user::{
    CreateUser, DailySignups, UpdateUser, User, UserQuery, UserWithRole,
};

use crate::memory::MemoryStore;
use crate::repositories::{
    ActivityLogRepository, ResetTokenRepository, RoleRepository, UserRepository,
};

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by email, ignoring ASCII case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Whether any account already uses `email` or `username`.
    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AppResult<bool>;

    /// Load a user with its role and permissions.
    async fn find_with_role(&self, id: UserId) -> AppResult<Option<UserWithRole>>;

    /// Filtered, ordered page of users with their roles.
    async fn list(&self, query: &UserQuery) -> AppResult<PageResponse<UserWithRole>>;

    /// Insert a user. Unique violations surface as `Conflict`.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Apply a partial update. `None` when the user is gone; unique
    /// violations surface as `Conflict`.
    async fn update(&self, id: UserId, data: &UpdateUser) -> AppResult<Option<User>>;

    /// Record a successful login.
    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()>;

    /// Replace the password hash. `NotFound` when the user is gone.
    async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()>;

    /// Activate or deactivate an account.
    async fn set_active(&self, id: UserId, active: bool) -> AppResult<Option<User>>;

    /// Activate or deactivate several accounts. Returns the number changed.
    async fn set_active_many(&self, ids: &[UserId], active: bool) -> AppResult<u64>;

    /// Delete a user. Returns `true` if a row was removed. Activity entries
    /// survive with their user cleared.
    async fn delete(&self, id: UserId) -> AppResult<bool>;

    /// Delete several users. Returns the number removed.
    async fn delete_many(&self, ids: &[UserId]) -> AppResult<u64>;

    /// Count all users.
    async fn count(&self) -> AppResult<u64>;

    /// Count users whose `is_active` equals `active`.
    async fn count_by_active(&self, active: bool) -> AppResult<u64>;

    /// Count users created at or after `since`.
    async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64>;

    /// Accounts created at or after `since`, grouped by UTC day, oldest first.
    async fn signups_per_day(&self, since: DateTime<Utc>) -> AppResult<Vec<DailySignups>>;
}

/// Role and permission persistence.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// Find a role by primary key.
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Find a role by exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Load a role with its permissions.
    async fn find_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleWithPermissions>>;

    /// All roles with their permissions, ordered by name.
    async fn list_with_permissions(&self) -> AppResult<Vec<RoleWithPermissions>>;

    /// All permissions, ordered by name.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// The permissions among `ids` that exist.
    async fn find_permissions(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>>;

    /// Insert a non-system role with its grants. A taken name is `Conflict`.
    async fn create(&self, data: &CreateRole) -> AppResult<RoleWithPermissions>;

    /// Apply a partial update, grants included, in one step. `None` when
    /// the role is gone; a taken name is `Conflict`.
    async fn update(&self, id: RoleId, data: &UpdateRole)
    -> AppResult<Option<RoleWithPermissions>>;

    /// Delete a role and its grants. Returns `true` if a row was removed.
    /// `Conflict` while any user still holds the role.
    async fn delete(&self, id: RoleId) -> AppResult<bool>;

    /// Count all roles.
    async fn count(&self) -> AppResult<u64>;

    /// Users per role for every role, ordered by role name.
    async fn user_counts(&self) -> AppResult<Vec<RoleUserCount>>;
}

/// Password-reset token persistence.
#[async_trait]
pub trait ResetTokenStore: Send + Sync + 'static {
    /// Persist a new token.
    async fn create(&self, data: &CreateResetToken) -> AppResult<PasswordResetToken>;

    /// Consume a token that is valid at `now` and set its owner's
    /// password hash, atomically.
    ///
    /// Returns the owner, or `None` when the token is unknown, expired, or
    /// already consumed. Of several concurrent calls with the same token at
    /// most one returns `Some`.
    async fn redeem(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> AppResult<Option<UserId>>;

    /// Delete every token that expired at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Append-only activity log.
#[async_trait]
pub trait ActivityLogStore: Send + Sync + 'static {
    /// Append an entry.
    async fn append(&self, data: &CreateActivityLog) -> AppResult<ActivityLog>;

    /// A user's entries, newest first.
    async fn find_by_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLog>>;

    /// The newest `limit` entries across all users.
    async fn recent(&self, limit: u64) -> AppResult<Vec<ActivityLog>>;
}

/// The full set of stores, shared by every service.
#[derive(Clone)]
pub struct Stores {
    /// Accounts.
    pub users: Arc<dyn UserStore>,
    /// Roles and permissions.
    pub roles: Arc<dyn RoleStore>,
    /// Password-reset tokens.
    pub reset_tokens: Arc<dyn ResetTokenStore>,
    /// Activity log.
    pub activity: Arc<dyn ActivityLogStore>,
}

impl Stores {
    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            reset_tokens: Arc::new(ResetTokenRepository::new(pool.clone())),
            activity: Arc::new(ActivityLogRepository::new(pool)),
        }
    }

    /// One in-memory store behind every trait.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            roles: store.clone(),
            reset_tokens: store.clone(),
            activity: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
