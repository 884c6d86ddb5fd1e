//! Application builder: wires router, middleware, and state into an Axum app.

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use warden_core::config::{AppConfig, DatabaseProvider};
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_database::migration::run_migrations;
use warden_database::{DatabasePool, MemoryStore, Stores};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();
    build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(build_cors_layer(&server.cors))
        .layer(TraceLayer::new_for_http())
}

/// Opens the configured store. The pool is returned for health checks and
/// shutdown; the in-memory provider has none.
pub async fn open_stores(config: &AppConfig) -> AppResult<(Stores, Option<DatabasePool>)> {
    match config.database.provider {
        DatabaseProvider::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                run_migrations(pool.pool()).await?;
            }
            Ok((Stores::postgres(pool.pool().clone()), Some(pool)))
        }
        DatabaseProvider::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            Ok((Stores::memory(MemoryStore::seeded()), None))
        }
    }
}

/// Runs the Warden server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting Warden server...");

    let (stores, db_pool) = open_stores(&config).await?;
    let addr = config.server.bind_address();
    let state = AppState::new(config, stores, db_pool.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e))?;

    info!(address = %addr, "Warden server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    info!("Warden server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
