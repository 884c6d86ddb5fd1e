//! In-process store backed by `tokio::sync::RwLock`.
//!
//! Implements every store trait with the same observable behavior as the
//! PostgreSQL repositories: unique-constraint conflicts, reset tokens removed
//! with their user, activity entries kept with the user cleared, and roles
//! that cannot be deleted while assigned. Seeded with the system roles on
//! construction.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::pagination::{PageRequest, PageResponse, SortOrder};
use warden_core::types::{ActivityLogId, PermissionId, ResetTokenId, RoleId, UserId};
use warden_entity::activity::{ActivityLog, CreateActivityLog};
use warden_entity::reset::{CreateResetToken, PasswordResetToken};
use warden_entity::role::{
    CreateRole, Permission, Role, RoleUserCount, RoleWithPermissions, UpdateRole,
};
use warden_entity::user::{
    CreateUser, DailySignups, UpdateUser, User, UserQuery, UserSortField, UserWithRole,
};

use crate::seed;
use crate::store::{ActivityLogStore, ResetTokenStore, RoleStore, UserStore};

#[derive(Debug, Default)]
struct MemoryData {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    role_permissions: Vec<(RoleId, PermissionId)>,
    reset_tokens: HashMap<ResetTokenId, PasswordResetToken>,
    activity: Vec<ActivityLog>,
}

impl MemoryData {
    fn role_with_permissions(&self, id: RoleId) -> Option<RoleWithPermissions> {
        let role = self.roles.get(&id)?.clone();
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .iter()
            .filter(|(role_id, _)| *role_id == id)
            .filter_map(|(_, perm_id)| self.permissions.get(perm_id).cloned())
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Some(RoleWithPermissions { role, permissions })
    }

    fn user_with_role(&self, user: &User) -> AppResult<UserWithRole> {
        let role = self.role_with_permissions(user.role_id).ok_or_else(|| {
            AppError::internal(format!("User {} references missing role {}", user.id, user.role_id))
        })?;
        Ok(UserWithRole {
            user: user.clone(),
            role,
        })
    }

    /// Whether another account uses `email` or `username`.
    fn identity_taken(&self, except: Option<UserId>, email: Option<&str>, username: Option<&str>) -> bool {
        self.users.values().filter(|u| Some(u.id) != except).any(|u| {
            email.is_some_and(|e| u.email.eq_ignore_ascii_case(e))
                || username.is_some_and(|n| u.username.eq_ignore_ascii_case(n))
        })
    }

    /// Grant exactly `permission_ids` to `role_id`, skipping unknown ids.
    fn replace_grants(&mut self, role_id: RoleId, permission_ids: &[PermissionId]) {
        self.role_permissions.retain(|(r, _)| *r != role_id);
        for perm_id in permission_ids {
            let grant = (role_id, *perm_id);
            if self.permissions.contains_key(perm_id) && !self.role_permissions.contains(&grant) {
                self.role_permissions.push(grant);
            }
        }
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        self.reset_tokens.retain(|_, t| t.user_id != id);
        for entry in self.activity.iter_mut().filter(|a| a.user_id == Some(id)) {
            entry.user_id = None;
        }
        true
    }

    /// Activity entries newest first. Append order breaks timestamp ties.
    fn activity_newest_first(&self, user_id: Option<UserId>) -> Vec<&ActivityLog> {
        let mut entries: Vec<&ActivityLog> = self
            .activity
            .iter()
            .filter(|a| user_id.is_none() || a.user_id == user_id)
            .collect();
        entries.reverse();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}

fn compare_users(a: &User, b: &User, field: UserSortField) -> Ordering {
    let ord = match field {
        UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        UserSortField::Email => a.email.cmp(&b.email),
        UserSortField::Username => a.username.cmp(&b.username),
        UserSortField::FirstName => a.first_name.cmp(&b.first_name),
        UserSortField::LastName => a.last_name.cmp(&b.last_name),
        UserSortField::LastLoginAt => a.last_login_at.cmp(&b.last_login_at),
    };
    ord.then_with(|| a.id.cmp(&b.id))
}

/// Shared in-memory store. Cloning shares the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    /// An empty store with no roles or permissions.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryData::default())),
        }
    }

    /// A store holding the system roles and permissions.
    pub fn seeded() -> Self {
        let mut data = MemoryData::default();
        let now = Utc::now();

        for (resource, action, description) in seed::PERMISSIONS {
            let permission = Permission {
                id: PermissionId::new(),
                name: Permission::composite_name(resource, action),
                resource: resource.to_string(),
                action: action.to_string(),
                description: description.to_string(),
            };
            data.permissions.insert(permission.id, permission);
        }

        for seed_role in seed::ROLES {
            let role = Role {
                id: RoleId::new(),
                name: seed_role.name.to_string(),
                description: seed_role.description.to_string(),
                is_system_role: true,
                created_at: now,
                updated_at: now,
            };
            for name in seed_role.permissions {
                if let Some(p) = data.permissions.values().find(|p| p.name == *name) {
                    data.role_permissions.push((role.id, p.id));
                }
            }
            data.roles.insert(role.id, role);
        }

        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Insert a role with the given composite permission names. Unknown
    /// names are created on the fly.
    pub async fn insert_role(&self, name: &str, permissions: &[&str]) -> Role {
        let mut data = self.inner.write().await;
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: name.to_string(),
            description: String::new(),
            is_system_role: false,
            created_at: now,
            updated_at: now,
        };
        for perm_name in permissions {
            let existing = data
                .permissions
                .values()
                .find(|p| p.name == *perm_name)
                .map(|p| p.id);
            let perm_id = match existing {
                Some(id) => id,
                None => {
                    let (resource, action) = perm_name.split_once('.').unwrap_or((*perm_name, ""));
                    let permission = Permission {
                        id: PermissionId::new(),
                        name: perm_name.to_string(),
                        resource: resource.to_string(),
                        action: action.to_string(),
                        description: String::new(),
                    };
                    let id = permission.id;
                    data.permissions.insert(id, permission);
                    id
                }
            };
            data.role_permissions.push((role.id, perm_id));
        }
        data.roles.insert(role.id, role.clone());
        role
    }

    /// Move an existing reset token's expiry.
    pub async fn set_reset_token_expiry(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        let mut data = self.inner.write().await;
        match data.reset_tokens.values_mut().find(|t| t.token == token) {
            Some(t) => {
                t.expires_at = expires_at;
                true
            }
            None => false,
        }
    }

    /// Move a user to another role. Returns `false` if either is unknown.
    pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> bool {
        let mut data = self.inner.write().await;
        if !data.roles.contains_key(&role_id) {
            return false;
        }
        match data.users.get_mut(&user_id) {
            Some(user) => {
                user.role_id = role_id;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// A stored reset token by value, expired or not.
    pub async fn reset_token(&self, token: &str) -> Option<PasswordResetToken> {
        let data = self.inner.read().await;
        data.reset_tokens.values().find(|t| t.token == token).cloned()
    }

    /// Number of stored reset tokens.
    pub async fn reset_token_count(&self) -> usize {
        self.inner.read().await.reset_tokens.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AppResult<bool> {
        let data = self.inner.read().await;
        Ok(data.users.values().any(|u| {
            u.email.eq_ignore_ascii_case(email) || u.username.eq_ignore_ascii_case(username)
        }))
    }

    async fn find_with_role(&self, id: UserId) -> AppResult<Option<UserWithRole>> {
        let data = self.inner.read().await;
        data.users
            .get(&id)
            .map(|user| data.user_with_role(user))
            .transpose()
    }

    async fn list(&self, query: &UserQuery) -> AppResult<PageResponse<UserWithRole>> {
        let data = self.inner.read().await;
        let term = query.search_term();
        let mut users: Vec<&User> = data
            .users
            .values()
            .filter(|u| match &term {
                Some(term) => [&u.first_name, &u.last_name, &u.email, &u.username]
                    .iter()
                    .any(|field| field.to_lowercase().contains(term.as_str())),
                None => true,
            })
            .collect();
        users.sort_by(|a, b| {
            let ord = compare_users(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let page = &query.page;
        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|u| data.user_with_role(u))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut store = self.inner.write().await;
        if store.identity_taken(None, Some(&data.email), Some(&data.username)) {
            return Err(AppError::conflict(
                "User with this email or username already exists",
            ));
        }
        if !store.roles.contains_key(&data.role_id) {
            return Err(AppError::database(format!(
                "Role {} does not exist",
                data.role_id
            )));
        }
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: data.email.clone(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role_id: data.role_id,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, data: &UpdateUser) -> AppResult<Option<User>> {
        let mut store = self.inner.write().await;
        if !store.users.contains_key(&id) {
            return Ok(None);
        }
        if store.identity_taken(Some(id), data.email.as_deref(), data.username.as_deref()) {
            return Err(AppError::conflict(
                "User with this email or username already exists",
            ));
        }
        if let Some(role_id) = data.role_id
            && !store.roles.contains_key(&role_id)
        {
            return Err(AppError::database(format!("Role {role_id} does not exist")));
        }

        let Some(user) = store.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = &data.email {
            user.email = email.clone();
        }
        if let Some(username) = &data.username {
            user.username = username.clone();
        }
        if let Some(first_name) = &data.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &data.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(role_id) = data.role_id {
            user.role_id = role_id;
        }
        if let Some(is_active) = data.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let mut data = self.inner.write().await;
        let user = data
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_active(&self, id: UserId, active: bool) -> AppResult<Option<User>> {
        let mut data = self.inner.write().await;
        Ok(data.users.get_mut(&id).map(|user| {
            user.is_active = active;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_active_many(&self, ids: &[UserId], active: bool) -> AppResult<u64> {
        let mut data = self.inner.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for user in data.users.values_mut().filter(|u| ids.contains(&u.id)) {
            user.is_active = active;
            user.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        Ok(self.inner.write().await.remove_user(id))
    }

    async fn delete_many(&self, ids: &[UserId]) -> AppResult<u64> {
        let mut data = self.inner.write().await;
        let mut removed = 0;
        for id in ids {
            if data.remove_user(*id) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.inner.read().await.users.len() as u64)
    }

    async fn count_by_active(&self, active: bool) -> AppResult<u64> {
        let data = self.inner.read().await;
        Ok(data.users.values().filter(|u| u.is_active == active).count() as u64)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let data = self.inner.read().await;
        Ok(data.users.values().filter(|u| u.created_at >= since).count() as u64)
    }

    async fn signups_per_day(&self, since: DateTime<Utc>) -> AppResult<Vec<DailySignups>> {
        let data = self.inner.read().await;
        let mut days: BTreeMap<_, i64> = BTreeMap::new();
        for user in data.users.values().filter(|u| u.created_at >= since) {
            *days.entry(user.created_at.date_naive()).or_default() += 1;
        }
        Ok(days
            .into_iter()
            .map(|(date, user_count)| DailySignups { date, user_count })
            .collect())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.inner.read().await.roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let data = self.inner.read().await;
        Ok(data.roles.values().find(|r| r.name == name).cloned())
    }

    async fn find_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleWithPermissions>> {
        Ok(self.inner.read().await.role_with_permissions(id))
    }

    async fn list_with_permissions(&self) -> AppResult<Vec<RoleWithPermissions>> {
        let data = self.inner.read().await;
        let mut roles: Vec<RoleWithPermissions> = data
            .roles
            .keys()
            .filter_map(|id| data.role_with_permissions(*id))
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let data = self.inner.read().await;
        let mut permissions: Vec<Permission> = data.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions)
    }

    async fn find_permissions(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        let data = self.inner.read().await;
        Ok(data
            .permissions
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, data: &CreateRole) -> AppResult<RoleWithPermissions> {
        let mut store = self.inner.write().await;
        if store.roles.values().any(|r| r.name == data.name) {
            return Err(AppError::conflict("Role with this name already exists"));
        }
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: data.name.clone(),
            description: data.description.clone(),
            is_system_role: false,
            created_at: now,
            updated_at: now,
        };
        let id = role.id;
        store.roles.insert(id, role);
        store.replace_grants(id, &data.permission_ids);
        store
            .role_with_permissions(id)
            .ok_or_else(|| AppError::internal(format!("Role {id} vanished after insert")))
    }

    async fn update(
        &self,
        id: RoleId,
        data: &UpdateRole,
    ) -> AppResult<Option<RoleWithPermissions>> {
        let mut store = self.inner.write().await;
        if let Some(name) = &data.name
            && store.roles.values().any(|r| r.id != id && r.name == *name)
        {
            return Err(AppError::conflict("Role with this name already exists"));
        }
        let Some(role) = store.roles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &data.name {
            role.name = name.clone();
        }
        if let Some(description) = &data.description {
            role.description = description.clone();
        }
        role.updated_at = Utc::now();
        if let Some(permission_ids) = &data.permission_ids {
            store.replace_grants(id, permission_ids);
        }
        Ok(store.role_with_permissions(id))
    }

    async fn delete(&self, id: RoleId) -> AppResult<bool> {
        let mut data = self.inner.write().await;
        if data.users.values().any(|u| u.role_id == id) {
            return Err(AppError::conflict("Role is assigned to users"));
        }
        let removed = data.roles.remove(&id).is_some();
        data.role_permissions.retain(|(r, _)| *r != id);
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.inner.read().await.roles.len() as u64)
    }

    async fn user_counts(&self) -> AppResult<Vec<RoleUserCount>> {
        let data = self.inner.read().await;
        let mut counts: Vec<RoleUserCount> = data
            .roles
            .values()
            .map(|role| RoleUserCount {
                role_id: role.id,
                role_name: role.name.clone(),
                user_count: data.users.values().filter(|u| u.role_id == role.id).count() as i64,
            })
            .collect();
        counts.sort_by(|a, b| a.role_name.cmp(&b.role_name));
        Ok(counts)
    }
}

#[async_trait]
impl ResetTokenStore for MemoryStore {
    async fn create(&self, data: &CreateResetToken) -> AppResult<PasswordResetToken> {
        let mut store = self.inner.write().await;
        if store.reset_tokens.values().any(|t| t.token == data.token) {
            return Err(AppError::conflict("Reset token already exists"));
        }
        let token = PasswordResetToken {
            id: ResetTokenId::new(),
            user_id: data.user_id,
            token: data.token.clone(),
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        store.reset_tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn redeem(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> AppResult<Option<UserId>> {
        let mut data = self.inner.write().await;
        let Some(id) = data
            .reset_tokens
            .values()
            .find(|t| t.token == token && t.is_valid_at(now))
            .map(|t| t.id)
        else {
            return Ok(None);
        };
        let Some(record) = data.reset_tokens.remove(&id) else {
            return Ok(None);
        };
        Ok(data.users.get_mut(&record.user_id).map(|user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            user.id
        }))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut data = self.inner.write().await;
        let before = data.reset_tokens.len();
        data.reset_tokens.retain(|_, t| t.is_valid_at(now));
        Ok((before - data.reset_tokens.len()) as u64)
    }
}

#[async_trait]
impl ActivityLogStore for MemoryStore {
    async fn append(&self, data: &CreateActivityLog) -> AppResult<ActivityLog> {
        let entry = ActivityLog {
            id: ActivityLogId::new(),
            user_id: Some(data.user_id),
            action: data.action.clone(),
            resource: data.resource.clone(),
            details: data.details.clone(),
            ip_address: data.ip_address.clone(),
            user_agent: data.user_agent.clone(),
            created_at: Utc::now(),
        };
        self.inner.write().await.activity.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ActivityLog>> {
        let data = self.inner.read().await;
        let entries = data.activity_newest_first(Some(user_id));
        let total = entries.len() as u64;
        let items = entries
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn recent(&self, limit: u64) -> AppResult<Vec<ActivityLog>> {
        let data = self.inner.read().await;
        Ok(data
            .activity_newest_first(None)
            .into_iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn create_user(store: &MemoryStore, email: &str, username: &str) -> AppResult<User> {
        let role = RoleStore::find_by_name(store, "User").await?.expect("seeded role");
        UserStore::create(
            store,
            &CreateUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: "hash".to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                role_id: role.id,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_seeded_roles() {
        let store = MemoryStore::seeded();
        let roles = store.list_with_permissions().await.expect("list");
        assert_eq!(roles.len(), 4);
        let manager = roles.iter().find(|r| r.role.name == "Manager").expect("manager");
        assert!(manager.allows("users", "update"));
        assert!(!manager.allows("users", "delete"));
        assert!(roles.iter().all(|r| r.role.is_system_role));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::seeded();
        create_user(&store, "a@example.com", "a").await.expect("first");
        let err = create_user(&store, "A@Example.com", "b").await.unwrap_err();
        assert_eq!(err.kind, warden_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_redeem_ignores_expired() {
        let store = MemoryStore::seeded();
        let user = create_user(&store, "a@example.com", "a").await.expect("user");
        let now = Utc::now();
        ResetTokenStore::create(
            &store,
            &CreateResetToken {
                user_id: user.id,
                token: "tok".to_string(),
                expires_at: now - Duration::seconds(1),
            },
        )
        .await
        .expect("create");
        assert!(store.redeem("tok", now, "new-hash").await.expect("redeem").is_none());
        assert_eq!(store.delete_expired(now).await.expect("sweep"), 1);
    }

    #[tokio::test]
    async fn test_redeem_consumes_token_and_sets_hash() {
        let store = MemoryStore::seeded();
        let user = create_user(&store, "a@example.com", "a").await.expect("user");
        let now = Utc::now();
        ResetTokenStore::create(
            &store,
            &CreateResetToken {
                user_id: user.id,
                token: "tok".to_string(),
                expires_at: now + Duration::hours(1),
            },
        )
        .await
        .expect("create");

        let owner = store.redeem("tok", now, "new-hash").await.expect("redeem");
        assert_eq!(owner, Some(user.id));
        let stored = UserStore::find_by_id(&store, user.id).await.expect("find").expect("user");
        assert_eq!(stored.password_hash, "new-hash");

        assert!(store.redeem("tok", now, "other-hash").await.expect("redeem").is_none());
        assert!(store.reset_token("tok").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_user_keeps_activity() {
        let store = MemoryStore::seeded();
        let user = create_user(&store, "a@example.com", "a").await.expect("user");
        let other = create_user(&store, "b@example.com", "b").await.expect("user");
        store
            .append(&CreateActivityLog::new(user.id, "login", "auth", "ok"))
            .await
            .expect("append");
        store
            .append(&CreateActivityLog::new(other.id, "login", "auth", "ok"))
            .await
            .expect("append");

        assert!(UserStore::delete(&store, user.id).await.expect("delete"));

        let recent = store.recent(10).await.expect("recent");
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().any(|a| a.user_id.is_none()));
        assert!(recent.iter().any(|a| a.user_id == Some(other.id)));
        let page = store
            .find_by_user(user.id, &PageRequest::default())
            .await
            .expect("page");
        assert_eq!(page.total_items, 0);
    }

    #[tokio::test]
    async fn test_list_searches_and_sorts() {
        let store = MemoryStore::seeded();
        create_user(&store, "zed@example.com", "zed").await.expect("user");
        create_user(&store, "amy@example.com", "amy").await.expect("user");
        create_user(&store, "bob@other.org", "bob").await.expect("user");

        let query = UserQuery {
            search: Some("EXAMPLE".to_string()),
            sort_by: UserSortField::Username,
            sort_order: SortOrder::Asc,
            page: PageRequest::new(1, 10),
        };
        let page = store.list(&query).await.expect("list");
        let names: Vec<&str> = page.items.iter().map(|u| u.user.username.as_str()).collect();
        assert_eq!(names, ["amy", "zed"]);
        assert_eq!(page.items[0].role_name(), "User");

        let second = store
            .list(&UserQuery {
                page: PageRequest::new(2, 2),
                ..UserQuery::default()
            })
            .await
            .expect("list");
        assert_eq!(second.total_items, 3);
        assert_eq!(second.items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() {
        let store = MemoryStore::seeded();
        let a = create_user(&store, "a@example.com", "a").await.expect("user");
        create_user(&store, "b@example.com", "b").await.expect("user");

        let err = UserStore::update(
            &store,
            a.id,
            &UpdateUser {
                username: Some("B".to_string()),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, warden_core::ErrorKind::Conflict);

        let renamed = UserStore::update(
            &store,
            a.id,
            &UpdateUser {
                username: Some("a".to_string()),
                first_name: Some("Ada".to_string()),
                ..UpdateUser::default()
            },
        )
        .await
        .expect("update")
        .expect("user");
        assert_eq!(renamed.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let store = MemoryStore::seeded();
        let perms = store.list_permissions().await.expect("perms");
        let role = RoleStore::create(
            &store,
            &CreateRole {
                name: "Auditor".to_string(),
                description: String::new(),
                permission_ids: vec![perms[0].id, perms[0].id],
            },
        )
        .await
        .expect("create");
        assert_eq!(role.permissions.len(), 1);
        assert!(!role.role.is_system_role);

        let user = create_user(&store, "a@example.com", "a").await.expect("user");
        assert!(store.assign_role(user.id, role.role.id).await);
        let err = RoleStore::delete(&store, role.role.id).await.unwrap_err();
        assert_eq!(err.kind, warden_core::ErrorKind::Conflict);

        UserStore::delete(&store, user.id).await.expect("delete user");
        assert!(RoleStore::delete(&store, role.role.id).await.expect("delete role"));
        assert_eq!(RoleStore::count(&store).await.expect("count"), 4);
    }
}
