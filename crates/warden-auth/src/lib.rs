//! # warden-auth
//!
//! Credential primitives and the authorization engine.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing and the password length policy
//! - `jwt` — access/refresh token issuance and validation
//! - `rbac` — role hierarchy and the store-backed permission resolver

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, PermissionGrant, RoleSnapshot, TokenPair, TokenService, TokenType};
pub use password::{PasswordHasher, PasswordPolicy};
pub use rbac::{PermissionResolver, RoleHierarchy};
