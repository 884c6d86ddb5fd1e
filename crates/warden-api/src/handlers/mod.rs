//! Route handlers organized by domain.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod profile;
pub mod role;
pub mod user;
