//! Reference data shared by the SQL seed migration and [`MemoryStore`].
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

/// `(resource, action, description)` for every permission.
pub const PERMISSIONS: &[(&str, &str, &str)] = &[
    ("users", "read", "View user accounts"),
    ("users", "create", "Create user accounts"),
    ("users", "update", "Update user accounts"),
    ("users", "delete", "Delete user accounts"),
    ("roles", "read", "View roles"),
    ("roles", "create", "Create roles"),
    ("roles", "update", "Update roles"),
    ("roles", "delete", "Delete roles"),
    ("permissions", "read", "View permissions"),
    ("dashboard", "read", "View the dashboard"),
    ("activity_logs", "read", "View activity logs"),
];

/// A system role and the composite names of its permissions.
#[derive(Debug, Clone, Copy)]
pub struct SeedRole {
    /// Role name.
    pub name: &'static str,
    /// Role description.
    pub description: &'static str,
    /// `resource.action` names granted to the role.
    pub permissions: &'static [&'static str],
}

/// The four system roles.
pub const ROLES: &[SeedRole] = &[
    SeedRole {
        name: "Super Admin",
        description: "Full access to every resource",
        permissions: &[
            "users.read",
            "users.create",
            "users.update",
            "users.delete",
            "roles.read",
            "roles.create",
            "roles.update",
            "roles.delete",
            "permissions.read",
            "dashboard.read",
            "activity_logs.read",
        ],
    },
    SeedRole {
        name: "Admin",
        description: "Administers users; read-only on roles",
        permissions: &[
            "users.read",
            "users.create",
            "users.update",
            "users.delete",
            "roles.read",
            "permissions.read",
            "dashboard.read",
            "activity_logs.read",
        ],
    },
    SeedRole {
        name: "Manager",
        description: "Reads and updates users",
        permissions: &[
            "users.read",
            "users.update",
            "dashboard.read",
            "activity_logs.read",
        ],
    },
    SeedRole {
        name: "User",
        description: "Default role for self-registered accounts",
        permissions: &["dashboard.read"],
    },
];
