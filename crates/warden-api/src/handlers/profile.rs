//! The caller's own account.

use axum::Json;
use axum::extract::State;

use crate::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.auth_service.profile(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_service
        .update_profile(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/profile/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .user_service
        .change_own_password(auth.context(), &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password updated successfully",
    ))))
}
