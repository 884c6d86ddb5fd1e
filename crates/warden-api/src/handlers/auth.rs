//! Auth handlers: register, login, refresh, logout, and password reset.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::dto::request::{
    ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::dto::response::{ApiResponse, AuthPayload, MessageResponse};
use crate::error::ApiError;
use crate::extractors::auth::{client_ip, user_agent};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// Reply to every forgot-password request, whatever happened.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If a matching account was found, a password reset link has been sent.";

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), ApiError> {
    let response = state.auth_service.register(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthPayload::from(response))),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, ApiError> {
    let response = state
        .auth_service
        .login(
            &req.email,
            &req.password,
            client_ip(&headers),
            user_agent(&headers),
        )
        .await?;
    Ok(Json(ApiResponse::ok(AuthPayload::from(response))))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, ApiError> {
    let response = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(AuthPayload::from(response))))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service.logout(auth.context()).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.reset_service.request_reset(&req.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        FORGOT_PASSWORD_MESSAGE,
    ))))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .reset_service
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password has been reset successfully",
    ))))
}
