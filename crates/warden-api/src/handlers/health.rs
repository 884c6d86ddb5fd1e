//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse, SystemHealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/system/health
pub async fn system_health(
    State(state): State<AppState>,
) -> Json<ApiResponse<SystemHealthResponse>> {
    let mut healthy = true;

    let (store, database_latency_ms) = match &state.db_pool {
        Some(pool) => match pool.ping().await {
            Ok(latency) => ("postgres", Some(latency.as_millis() as u64)),
            Err(e) => {
                warn!(error = %e, "Database ping failed");
                healthy = false;
                ("postgres", None)
            }
        },
        None => ("memory", None),
    };

    let user_count = match state.stores.users.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "User count failed");
            healthy = false;
            None
        }
    };

    Json(ApiResponse::ok(SystemHealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: store.to_string(),
        database_latency_ms,
        user_count,
    }))
}
