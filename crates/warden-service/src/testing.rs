//! Fixtures shared by the service unit tests.

use std::sync::Arc;

use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_auth::rbac::{PermissionResolver, RoleHierarchy};
use warden_auth::{RoleSnapshot, TokenService};
use warden_core::config::AppConfig;
use warden_core::types::UserId;
use warden_database::store::{RoleStore, UserStore};
use warden_database::{MemoryStore, Stores};
use warden_entity::user::CreateUser;

use crate::context::RequestContext;

pub(crate) struct Fixture {
    pub memory: MemoryStore,
    pub stores: Stores,
    pub config: AppConfig,
    pub hasher: Arc<PasswordHasher>,
    pub policy: Arc<PasswordPolicy>,
    pub tokens: Arc<TokenService>,
    pub resolver: Arc<PermissionResolver>,
}

impl Fixture {
    pub fn new() -> Self {
        let memory = MemoryStore::seeded();
        let stores = Stores::memory(memory.clone());
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "service-test-secret".to_string();
        let resolver = Arc::new(PermissionResolver::new(
            stores.users.clone(),
            Arc::new(RoleHierarchy::from_config(&config.rbac)),
        ));
        Self {
            memory,
            hasher: Arc::new(PasswordHasher::new()),
            policy: Arc::new(PasswordPolicy::new(&config.auth)),
            tokens: Arc::new(TokenService::new(&config.auth)),
            resolver,
            stores,
            config,
        }
    }

    /// Insert an active user holding `role` with password `password`.
    pub async fn user(&self, role: &str, username: &str, password: &str) -> UserId {
        let role = RoleStore::find_by_name(&self.memory, role)
            .await
            .expect("lookup")
            .expect("seeded role");
        UserStore::create(
            &self.memory,
            &CreateUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password_hash: self.hasher.hash_password(password).expect("hash"),
                first_name: username.to_string(),
                last_name: "Test".to_string(),
                role_id: role.id,
            },
        )
        .await
        .expect("create")
        .id
    }

    /// A request context for an existing user.
    pub async fn ctx(&self, user_id: UserId) -> RequestContext {
        let role = self.resolver.get_user_role(user_id).await.expect("role");
        RequestContext::new(
            user_id,
            RoleSnapshot::from(&role),
            Some("127.0.0.1".to_string()),
            Some("tests".to_string()),
        )
    }
}
