//! Role-based access control.

pub mod hierarchy;
pub mod resolver;

pub use hierarchy::RoleHierarchy;
pub use resolver::PermissionResolver;
