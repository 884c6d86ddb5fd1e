//! Role ranks used for "may this user manage that user" decisions.

use std::collections::HashMap;

use warden_core::config::RbacConfig;

/// Immutable role-name to rank table.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    ranks: HashMap<String, u8>,
}

impl RoleHierarchy {
    /// Build from the `rbac.hierarchy` configuration list.
    pub fn from_config(config: &RbacConfig) -> Self {
        Self::from_pairs(config.hierarchy.iter().map(|e| (e.role.as_str(), e.rank)))
    }

    /// Build from `(role, rank)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        Self {
            ranks: pairs
                .into_iter()
                .map(|(role, rank)| (role.to_string(), rank))
                .collect(),
        }
    }

    /// Rank of a role, `None` when the role is not in the table.
    pub fn rank(&self, role: &str) -> Option<u8> {
        self.ranks.get(role).copied()
    }

    /// Strictly-greater comparison. Unranked roles never manage and are
    /// never managed.
    pub fn can_manage(&self, manager_role: &str, target_role: &str) -> bool {
        match (self.rank(manager_role), self.rank(target_role)) {
            (Some(manager), Some(target)) => manager > target,
            _ => false,
        }
    }

    /// Highest rank in the table.
    pub fn top_rank(&self) -> Option<u8> {
        self.ranks.values().max().copied()
    }

    /// Whether a holder of `manager_role` may give `role` to someone.
    ///
    /// Only ranked roles are assignable, since holders of an unranked role
    /// could never be managed afterwards. Strictly lower ranks may be
    /// handed out; the top rank may also hand out its own.
    pub fn can_assign(&self, manager_role: &str, role: &str) -> bool {
        let (Some(manager), Some(target)) = (self.rank(manager_role), self.rank(role)) else {
            return false;
        };
        manager > target || Some(manager) == self.top_rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [&str; 4] = ["Super Admin", "Admin", "Manager", "User"];

    fn hierarchy() -> RoleHierarchy {
        RoleHierarchy::from_config(&RbacConfig::default())
    }

    #[test]
    fn test_truth_table() {
        let h = hierarchy();
        for (i, manager) in ROLES.iter().enumerate() {
            for (j, target) in ROLES.iter().enumerate() {
                // ROLES is ordered highest rank first.
                assert_eq!(h.can_manage(manager, target), i < j, "{manager} -> {target}");
            }
        }
    }

    #[test]
    fn test_equal_rank_never_manages() {
        let h = RoleHierarchy::from_pairs([("Auditor", 2), ("Manager", 2)]);
        assert!(!h.can_manage("Auditor", "Manager"));
        assert!(!h.can_manage("Manager", "Manager"));
    }

    #[test]
    fn test_unranked_roles() {
        let h = hierarchy();
        assert_eq!(h.rank("Guest"), None);
        assert!(!h.can_manage("Guest", "User"));
        assert!(!h.can_manage("Super Admin", "Guest"));
    }

    #[test]
    fn test_assignable_roles() {
        let h = hierarchy();
        assert!(h.can_assign("Super Admin", "Super Admin"));
        assert!(!h.can_assign("Super Admin", "Auditor"));
        assert!(h.can_assign("Admin", "Manager"));
        assert!(!h.can_assign("Admin", "Admin"));
        assert!(!h.can_assign("Admin", "Super Admin"));
        assert!(!h.can_assign("Manager", "Auditor"));
        assert!(!h.can_assign("Guest", "User"));
        assert_eq!(h.top_rank(), h.rank("Super Admin"));
    }
}
