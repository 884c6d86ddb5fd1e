//! Role administration and permission listings.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use warden_entity::role::{Permission, RoleWithPermissions};

use crate::dto::request::{AssignPermissionsRequest, CreateRoleRequest, UpdateRoleRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, RoleIdPath, ValidatedJson};
use crate::state::AppState;

/// GET /api/roles
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoleWithPermissions>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.role_service.list_roles().await?)))
}

/// GET /api/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    RoleIdPath(id): RoleIdPath,
) -> Result<Json<ApiResponse<RoleWithPermissions>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.role_service.get_role(id).await?)))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoleWithPermissions>>), ApiError> {
    let role = state
        .role_service
        .create_role(auth.context(), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(role))))
}

/// PUT /api/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    RoleIdPath(id): RoleIdPath,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<RoleWithPermissions>>, ApiError> {
    let role = state
        .role_service
        .update_role(auth.context(), id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// DELETE /api/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    RoleIdPath(id): RoleIdPath,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.role_service.delete_role(auth.context(), id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Role deleted successfully",
    ))))
}

/// GET /api/roles/{id}/permissions
pub async fn role_permissions(
    State(state): State<AppState>,
    RoleIdPath(id): RoleIdPath,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.role_service.role_permissions(id).await?,
    )))
}

/// PUT /api/roles/{id}/permissions
pub async fn assign_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    RoleIdPath(id): RoleIdPath,
    ValidatedJson(req): ValidatedJson<AssignPermissionsRequest>,
) -> Result<Json<ApiResponse<RoleWithPermissions>>, ApiError> {
    let role = state
        .role_service
        .assign_permissions(auth.context(), id, &req.permission_ids)
        .await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// GET /api/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.role_service.list_permissions().await?,
    )))
}
