//! Dashboard aggregates.

use axum::Json;
use axum::extract::{Query, State};

use warden_entity::activity::ActivityLog;
use warden_entity::role::RoleUserCount;
use warden_entity::user::DailySignups;
use warden_service::DashboardStats;

use crate::dto::request::{AnalyticsParams, RecentActivityParams};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.dashboard_service.stats().await?)))
}

/// GET /api/dashboard/role-distribution
pub async fn role_distribution(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RoleUserCount>>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.dashboard_service.role_distribution().await?,
    )))
}

/// GET /api/dashboard/recent-activity?limit=
pub async fn recent_activity(
    State(state): State<AppState>,
    Query(params): Query<RecentActivityParams>,
) -> Result<Json<ApiResponse<Vec<ActivityLog>>>, ApiError> {
    let entries = state
        .dashboard_service
        .recent_activity(params.limit())
        .await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// GET /api/dashboard/user-analytics?days=
pub async fn user_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<ApiResponse<Vec<DailySignups>>>, ApiError> {
    let series = state
        .dashboard_service
        .user_analytics(params.days())
        .await?;
    Ok(Json(ApiResponse::ok(series)))
}
