//! Role administration and permission listings.

pub mod service;

pub use service::{CreateRoleInput, RoleService};
