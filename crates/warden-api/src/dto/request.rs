//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use warden_core::types::pagination::{PageRequest, SortOrder};
use warden_core::types::{PermissionId, RoleId, UserId};
use warden_entity::role::UpdateRole;
use warden_entity::user::{UpdateUser, UserQuery, UserSortField};
use warden_service::dashboard::service::{
    DEFAULT_ACTIVITY_LIMIT, DEFAULT_ANALYTICS_DAYS, MAX_ACTIVITY_LIMIT, MAX_ANALYTICS_DAYS,
};
use warden_service::role::CreateRoleInput;
use warden_service::RegisterInput;
use warden_service::user::{BulkAction, CreateUserInput, ProfileUpdate};

use crate::extractors::pagination::{default_page, default_per_page};

/// Self-registration body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Login name.
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    /// Password; strength rules are applied by the service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Given name.
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Login body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Forgot-password body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address of the account.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Reset-password body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Token from the reset message.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Change of the caller's own password.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Password set on `/users/{id}/password`. `current_password` is only
/// required when the target is the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPasswordRequest {
    /// Current password, for the caller's own account.
    pub current_password: Option<String>,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Administrator-created account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    pub role_id: RoleId,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role_id: req.role_id,
        }
    }
}

/// Partial update on `/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub role_id: Option<RoleId>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            role_id: req.role_id,
            is_active: req.is_active,
        }
    }
}

/// Edit of the caller's own profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// One action over many accounts.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkActionRequest {
    #[validate(length(min = 1, message = "No user IDs provided"))]
    pub user_ids: Vec<UserId>,
    pub action: BulkAction,
}

/// Query string of `GET /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: UserSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl From<UserListParams> for UserQuery {
    fn from(params: UserListParams) -> Self {
        Self {
            search: params.search,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
            page: PageRequest::new(params.page, params.per_page),
        }
    }
}

/// New custom role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "Role name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

impl From<CreateRoleRequest> for CreateRoleInput {
    fn from(req: CreateRoleRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            permission_ids: req.permission_ids,
        }
    }
}

/// Partial role update. A present `permission_ids` replaces every grant.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "Role name must be 1-100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<PermissionId>>,
}

impl From<UpdateRoleRequest> for UpdateRole {
    fn from(req: UpdateRoleRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            permission_ids: req.permission_ids,
        }
    }
}

/// Full replacement of a role's grants.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignPermissionsRequest {
    pub permission_ids: Vec<PermissionId>,
}

/// Query string of `GET /dashboard/recent-activity`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentActivityParams {
    pub limit: Option<u64>,
}

impl RecentActivityParams {
    /// The requested limit, or the default when absent or out of range.
    pub fn limit(&self) -> u64 {
        self.limit
            .filter(|n| (1..=MAX_ACTIVITY_LIMIT).contains(n))
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
    }
}

/// Query string of `GET /dashboard/user-analytics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsParams {
    pub days: Option<u32>,
}

impl AnalyticsParams {
    /// The requested window, or the default when absent or out of range.
    pub fn days(&self) -> u32 {
        self.days
            .filter(|n| (1..=MAX_ANALYTICS_DAYS).contains(n))
            .unwrap_or(DEFAULT_ANALYTICS_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let mut req = RegisterRequest {
            email: "not-an-email".to_string(),
            username: "ab".to_string(),
            password: "password1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("username"));

        req.email = "ada@example.com".to_string();
        req.username = "ada".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_user_validates_present_fields() {
        let req = UpdateUserRequest {
            email: Some("nope".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("email"));
        assert!(UpdateUserRequest::default().validate().is_ok());
    }

    #[test]
    fn test_bulk_action_parses() {
        let req: BulkActionRequest = serde_json::from_str(
            r#"{"user_ids": [], "action": "deactivate"}"#,
        )
        .expect("parse");
        assert_eq!(req.action, BulkAction::Deactivate);
        assert!(req.validate().is_err());
        let unknown = r#"{"user_ids": [], "action": "purge"}"#;
        assert!(serde_json::from_str::<BulkActionRequest>(unknown).is_err());
    }

    #[test]
    fn test_dashboard_params_fall_back_to_defaults() {
        assert_eq!(RecentActivityParams::default().limit(), 20);
        assert_eq!(RecentActivityParams { limit: Some(500) }.limit(), 20);
        assert_eq!(RecentActivityParams { limit: Some(5) }.limit(), 5);
        assert_eq!(AnalyticsParams { days: Some(0) }.days(), 30);
        assert_eq!(AnalyticsParams { days: Some(365) }.days(), 365);
    }
}
