//! Typed identifiers.
//!
//! Each entity gets its own UUID newtype so a `RoleId` can never be bound
//! where a `UserId` is expected. With the `sqlx` feature the wrappers encode
//! as plain PostgreSQL `uuid` columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// A fresh random (v4) identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The wrapped UUID.
            pub const fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

entity_id!(
    /// Account identifier.
    UserId
);

entity_id!(
    /// Role identifier.
    RoleId
);

entity_id!(
    /// Permission identifier.
    PermissionId
);

entity_id!(
    /// Password-reset token row identifier.
    ResetTokenId
);

entity_id!(
    /// Activity log entry identifier.
    ActivityLogId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn test_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(UserId::from_uuid(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn test_parse() {
        let uuid = Uuid::new_v4();
        let id: RoleId = uuid.to_string().parse().expect("parse");
        assert_eq!(id.into_uuid(), uuid);
        assert!("not-a-uuid".parse::<RoleId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_string() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&UserId::from(uuid)).expect("serialize");
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
