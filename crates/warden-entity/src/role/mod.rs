//! Role and permission entities.

pub mod model;
pub mod permission;

pub use model::{CreateRole, Role, RoleUserCount, RoleWithPermissions, UpdateRole};
pub use permission::Permission;
