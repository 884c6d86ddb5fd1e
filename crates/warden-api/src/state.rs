//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use warden_auth::jwt::TokenService;
use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_auth::rbac::{PermissionResolver, RoleHierarchy};
use warden_core::config::AppConfig;
use warden_database::{DatabasePool, Stores};
use warden_service::password::{DiscardDelivery, ResetDelivery};
use warden_service::{
    AuthService, DashboardService, PasswordResetService, RoleService, UserService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheaply clonable.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool, absent for the in-memory provider
    pub db_pool: Option<DatabasePool>,
    /// Store trait objects
    pub stores: Stores,
    /// Access/refresh token issuer and validator
    pub tokens: Arc<TokenService>,
    /// Role and permission lookups
    pub resolver: Arc<PermissionResolver>,
    /// Registration, login, refresh
    pub auth_service: Arc<AuthService>,
    /// User administration
    pub user_service: Arc<UserService>,
    /// Role administration and permission listings
    pub role_service: Arc<RoleService>,
    /// Dashboard aggregates
    pub dashboard_service: Arc<DashboardService>,
    /// Password-reset tokens
    pub reset_service: Arc<PasswordResetService>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("has_db_pool", &self.db_pool.is_some())
            .field("stores", &self.stores)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires every service over `stores`. Reset tokens are discarded until a
    /// delivery channel is supplied through [`AppState::with_delivery`].
    pub fn new(config: AppConfig, stores: Stores, db_pool: Option<DatabasePool>) -> Self {
        Self::with_delivery(config, stores, db_pool, Arc::new(DiscardDelivery))
    }

    /// Like [`AppState::new`] with an explicit reset-token delivery channel.
    pub fn with_delivery(
        config: AppConfig,
        stores: Stores,
        db_pool: Option<DatabasePool>,
        delivery: Arc<dyn ResetDelivery>,
    ) -> Self {
        let hasher = Arc::new(PasswordHasher::new());
        let policy = Arc::new(PasswordPolicy::new(&config.auth));
        let tokens = Arc::new(TokenService::new(&config.auth));
        let hierarchy = Arc::new(RoleHierarchy::from_config(&config.rbac));
        let resolver = Arc::new(PermissionResolver::new(stores.users.clone(), hierarchy));

        let auth_service = Arc::new(AuthService::new(
            &stores,
            Arc::clone(&hasher),
            Arc::clone(&policy),
            Arc::clone(&tokens),
            config.rbac.default_role.clone(),
        ));
        let user_service = Arc::new(UserService::new(
            &stores,
            Arc::clone(&resolver),
            Arc::clone(&hasher),
            Arc::clone(&policy),
        ));
        let role_service = Arc::new(RoleService::new(&stores));
        let dashboard_service = Arc::new(DashboardService::new(&stores));
        let reset_service = Arc::new(PasswordResetService::new(
            &stores,
            hasher,
            policy,
            delivery,
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            stores,
            tokens,
            resolver,
            auth_service,
            user_service,
            role_service,
            dashboard_service,
            reset_service,
            started_at: Instant::now(),
        }
    }
}
