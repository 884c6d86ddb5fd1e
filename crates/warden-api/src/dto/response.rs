//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::{RoleId, UserId};
use warden_entity::user::UserWithRole;
use warden_service::AuthResponse;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A user with its role name and effective permission names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub role_id: RoleId,
    pub role: String,
    pub permissions: Vec<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserWithRole> for UserResponse {
    fn from(value: UserWithRole) -> Self {
        let UserWithRole { user, role } = value;
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            role_id: user.role_id,
            role: role.role.name,
            permissions: role.permissions.into_iter().map(|p| p.name).collect(),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Credentials plus the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
    /// User info.
    pub user: UserResponse,
}

impl From<AuthResponse> for AuthPayload {
    fn from(value: AuthResponse) -> Self {
        let tokens = value.tokens;
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            access_expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
            user: value.user.into(),
        }
    }
}

/// Public liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok".
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the process started.
    pub uptime_seconds: u64,
}

/// Administrator health view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the process started.
    pub uptime_seconds: u64,
    /// Store provider: "postgres" or "memory".
    pub store: String,
    /// Database round-trip latency, when a pool is configured and reachable.
    pub database_latency_ms: Option<u64>,
    /// Registered accounts.
    pub user_count: Option<u64>,
}
