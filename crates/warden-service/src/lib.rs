//! # warden-service
//!
//! Business logic service layer for Warden. Each service orchestrates the
//! stores and the credential primitives from `warden-auth` to implement one
//! group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub(crate) mod activity;
pub mod auth;
pub mod context;
pub mod dashboard;
pub mod password;
pub mod role;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthResponse, AuthService, RegisterInput};
pub use context::RequestContext;
pub use dashboard::{DashboardService, DashboardStats};
pub use password::PasswordResetService;
pub use role::RoleService;
pub use user::UserService;
