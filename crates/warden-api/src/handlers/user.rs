//! User administration handlers. Route guards decide who may call each
//! endpoint; the service decides whether the caller may touch the target.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use warden_core::types::pagination::PageResponse;
use warden_entity::activity::ActivityLog;
use warden_entity::user::User;
use warden_service::user::BulkActionResult;

use crate::dto::request::{
    BulkActionRequest, CreateUserRequest, SetPasswordRequest, UpdateUserRequest, UserListParams,
};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, UserIdPath, ValidatedJson};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<ApiResponse<PageResponse<UserResponse>>>, ApiError> {
    let page = state.user_service.list_users(&params.into()).await?;
    Ok(Json(ApiResponse::ok(page.map(UserResponse::from))))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state
        .user_service
        .create_user(auth.context(), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    UserIdPath(id): UserIdPath,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_service
        .update_user(auth.context(), id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// POST /api/users/bulk-actions
pub async fn bulk_action(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkActionRequest>,
) -> Result<Json<ApiResponse<BulkActionResult>>, ApiError> {
    let result = state
        .user_service
        .bulk_action(auth.context(), req.action, &req.user_ids)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/{id}/activate
pub async fn activate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    UserIdPath(id): UserIdPath,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service.set_active(auth.context(), id, true).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/users/{id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    UserIdPath(id): UserIdPath,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .user_service
        .set_active(auth.context(), id, false)
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    UserIdPath(id): UserIdPath,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service.delete_user(auth.context(), id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "User deleted successfully",
    ))))
}

/// PUT /api/users/{id}/password
pub async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    UserIdPath(id): UserIdPath,
    ValidatedJson(req): ValidatedJson<SetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_service
        .set_password(
            auth.context(),
            id,
            req.current_password.as_deref(),
            &req.new_password,
        )
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// GET /api/users/{id}/activity
pub async fn user_activity(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ActivityLog>>>, ApiError> {
    let page = state
        .user_service
        .activity(id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
