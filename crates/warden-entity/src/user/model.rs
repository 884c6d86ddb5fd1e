//! User entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use warden_core::types::pagination::{PageRequest, SortOrder};
use warden_core::types::{RoleId, UserId};

use crate::role::RoleWithPermissions;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique email address, used to log in.
    pub email: String,
    /// Unique login name.
    pub username: String,
    /// Argon2id PHC string.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The single role this user holds.
    pub role_id: RoleId,
    /// Deactivated accounts cannot log in or refresh.
    pub is_active: bool,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", trimmed when either part is empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Assigned role.
    pub role_id: RoleId,
}

/// Partial update of an account. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<RoleId>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role_id.is_none()
            && self.is_active.is_none()
    }

    /// Whether the update touches the role or the active flag.
    pub fn changes_access(&self) -> bool {
        self.role_id.is_some() || self.is_active.is_some()
    }
}

/// Column a user listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSortField {
    #[default]
    CreatedAt,
    Email,
    Username,
    FirstName,
    LastName,
    LastLoginAt,
}

impl UserSortField {
    /// The `users` column this field sorts on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Email => "email",
            Self::Username => "username",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::LastLoginAt => "last_login_at",
        }
    }
}

/// Filter, order, and window of a user listing.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Case-insensitive substring of first name, last name, email, or username.
    pub search: Option<String>,
    pub sort_by: UserSortField,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl UserQuery {
    /// The trimmed, lowercased search term, if any.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Accounts created on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailySignups {
    pub date: NaiveDate,
    pub user_count: i64,
}

/// A user with its role and the role's permissions eagerly loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRole {
    /// The account.
    #[serde(flatten)]
    pub user: User,
    /// The account's role.
    pub role: RoleWithPermissions,
}

impl UserWithRole {
    /// Role name shortcut.
    pub fn role_name(&self) -> &str {
        &self.role.role.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role_id: RoleId::new(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_update_classification() {
        assert!(UpdateUser::default().is_empty());
        let rename = UpdateUser {
            first_name: Some("Ada".to_string()),
            ..UpdateUser::default()
        };
        assert!(!rename.is_empty());
        assert!(!rename.changes_access());
        let promote = UpdateUser {
            role_id: Some(RoleId::new()),
            ..UpdateUser::default()
        };
        assert!(promote.changes_access());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let mut query = UserQuery {
            search: Some("   ".to_string()),
            ..UserQuery::default()
        };
        assert_eq!(query.search_term(), None);
        query.search = Some(" Ada ".to_string());
        assert_eq!(query.search_term().as_deref(), Some("ada"));
    }

    #[test]
    fn test_full_name() {
        let mut user = sample();
        assert_eq!(user.full_name(), "Ada Lovelace");
        user.last_name.clear();
        assert_eq!(user.full_name(), "Ada");
    }
}
