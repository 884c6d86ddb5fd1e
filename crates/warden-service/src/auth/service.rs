//! Session/auth orchestration: turns credentials into token pairs.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warden_auth::jwt::{RoleSnapshot, TokenPair, TokenService};
use warden_auth::password::{PasswordHasher, PasswordPolicy};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_database::Stores;
use warden_database::store::{ActivityLogStore, RoleStore, UserStore};
use warden_entity::activity::CreateActivityLog;
use warden_entity::user::{CreateUser, UserWithRole};

use crate::activity;
use crate::context::RequestContext;

/// Self-registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    /// Email address; stored lowercased.
    pub email: String,
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Result of register, login, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Freshly issued credentials.
    pub tokens: TokenPair,
    /// The authenticated user with role and permissions.
    pub user: UserWithRole,
}

/// Issues credentials for registered users.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    activity: Arc<dyn ActivityLogStore>,
    hasher: Arc<PasswordHasher>,
    policy: Arc<PasswordPolicy>,
    tokens: Arc<TokenService>,
    default_role: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("default_role", &self.default_role)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        stores: &Stores,
        hasher: Arc<PasswordHasher>,
        policy: Arc<PasswordPolicy>,
        tokens: Arc<TokenService>,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            users: stores.users.clone(),
            roles: stores.roles.clone(),
            activity: stores.activity.clone(),
            hasher,
            policy,
            tokens,
            default_role: default_role.into(),
        }
    }

    /// Create an account with the default role and log it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_string();
        self.policy.validate(&input.password)?;

        if self.users.exists_by_email_or_username(&email, &username).await? {
            return Err(AppError::conflict(
                "User with this email or username already exists",
            ));
        }

        let role = self
            .roles
            .find_by_name(&self.default_role)
            .await?
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "Default role '{}' is not seeded",
                    self.default_role
                ))
            })?;

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

        info!(user_id = %user.id, role = %role.name, "User registered");
        let user = self.load(user.id).await?;
        self.respond(user)
    }

    /// Exchange email and password for a token pair.
    ///
    /// Unknown email and wrong password fail identically. A deactivated
    /// account is only reported once the password has been verified.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<AuthResponse> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            self.hasher.verify_dummy(password);
            debug!("Login attempt for unknown email");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::invalid_credentials());
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login refused: account deactivated");
            return Err(AppError::account_deactivated());
        }

        if let Err(e) = self.users.update_last_login(user.id, Utc::now()).await {
            warn!(user_id = %user.id, error = %e, "Failed to update last login");
        }

        activity::record(
            self.activity.as_ref(),
            CreateActivityLog::new(user.id, "login", "auth", "User logged in successfully")
                .with_client(ip_address, user_agent),
        )
        .await;

        let user = self.load(user.id).await?;
        info!(user_id = %user.user.id, "Login successful");
        self.respond(user)
    }

    /// Exchange a refresh token for a brand-new pair.
    ///
    /// The user and role are reloaded, so the new access token reflects the
    /// current role. The old refresh token stays valid until it expires.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.tokens.validate_refresh_token(refresh_token).map_err(|e| {
            debug!(reason = %e, "Refresh token rejected");
            AppError::authentication("Invalid refresh token")
        })?;

        let user = self
            .users
            .find_with_role(claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        if !user.user.is_active {
            return Err(AppError::account_deactivated());
        }

        debug!(user_id = %user.user.id, "Token pair refreshed");
        self.respond(user)
    }

    /// Record the logout. Issued tokens stay valid until they expire.
    pub async fn logout(&self, ctx: &RequestContext) -> AppResult<()> {
        activity::record(
            self.activity.as_ref(),
            CreateActivityLog::new(ctx.user_id, "logout", "auth", "User logged out")
                .with_client(ctx.ip_address.clone(), ctx.user_agent.clone()),
        )
        .await;
        info!(user_id = %ctx.user_id, "User logged out");
        Ok(())
    }

    /// The caller's account with role and permissions.
    pub async fn profile(&self, user_id: UserId) -> AppResult<UserWithRole> {
        self.users
            .find_with_role(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn load(&self, user_id: UserId) -> AppResult<UserWithRole> {
        self.users
            .find_with_role(user_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("User {user_id} vanished during sign-in")))
    }

    fn respond(&self, user: UserWithRole) -> AppResult<AuthResponse> {
        let tokens = self
            .tokens
            .issue_pair(user.user.id, &RoleSnapshot::from(&user.role))?;
        Ok(AuthResponse { tokens, user })
    }
}
