//! Route definitions for the Warden HTTP API.
//!
//! All routes are mounted under `/api`. Guards are attached per route group
//! and authentication wraps every protected group.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware::RouteGuards;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Role names allowed on the system health view.
const SYSTEM_ROLES: &[&str] = &["Super Admin", "Admin"];

/// Role names allowed to edit roles and run bulk user actions.
const OWNER_ROLES: &[&str] = &["Super Admin"];

/// Build the complete Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(session_routes())
        .merge(user_routes(&state))
        .merge(role_routes(&state))
        .merge(dashboard_routes(&state))
        .merge(system_routes(&state))
        .require_auth(&state);

    Router::new()
        .nest("/api", public_routes().merge(protected))
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}

/// Endpoints that need no token.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
}

/// Endpoints any authenticated caller may use on their own account.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/profile/password", put(handlers::profile::change_password))
}

/// User administration.
fn user_routes(state: &AppState) -> Router<AppState> {
    let list = Router::new()
        .route("/users", get(handlers::user::list_users))
        .require_permission(state, "users", "read");

    let create = Router::new()
        .route("/users", post(handlers::user::create_user))
        .require_permission(state, "users", "create");

    let read = Router::new()
        .route("/users/{id}", get(handlers::user::get_user))
        .self_or_permission(state, "users", "read");

    let update = Router::new()
        .route("/users/{id}", put(handlers::user::update_user))
        .self_or_permission(state, "users", "update");

    let activity = Router::new()
        .route("/users/{id}/activity", get(handlers::user::user_activity))
        .self_or_permission(state, "activity_logs", "read");

    let password = Router::new()
        .route("/users/{id}/password", put(handlers::user::set_password))
        .self_or_permission(state, "users", "update");

    let status = Router::new()
        .route("/users/{id}/activate", put(handlers::user::activate_user))
        .route("/users/{id}/deactivate", put(handlers::user::deactivate_user))
        .require_permission(state, "users", "update");

    let remove = Router::new()
        .route("/users/{id}", delete(handlers::user::delete_user))
        .require_permission(state, "users", "delete");

    let bulk = Router::new()
        .route("/users/bulk-actions", post(handlers::user::bulk_action))
        .require_role(state, OWNER_ROLES);

    Router::new()
        .merge(list)
        .merge(create)
        .merge(read)
        .merge(update)
        .merge(activity)
        .merge(password)
        .merge(status)
        .merge(remove)
        .merge(bulk)
}

/// Role administration and permission listings.
fn role_routes(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/roles", get(handlers::role::list_roles))
        .route("/roles/{id}", get(handlers::role::get_role))
        .require_permission(state, "roles", "read");

    let manage = Router::new()
        .route("/roles", post(handlers::role::create_role))
        .route(
            "/roles/{id}",
            put(handlers::role::update_role).delete(handlers::role::delete_role),
        )
        .route("/roles/{id}/permissions", put(handlers::role::assign_permissions))
        .require_role(state, OWNER_ROLES);

    let permissions = Router::new()
        .route("/permissions", get(handlers::role::list_permissions))
        .route("/roles/{id}/permissions", get(handlers::role::role_permissions))
        .require_permission(state, "permissions", "read");

    read.merge(manage).merge(permissions)
}

/// Dashboard aggregates.
fn dashboard_routes(state: &AppState) -> Router<AppState> {
    let stats = Router::new()
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route(
            "/dashboard/role-distribution",
            get(handlers::dashboard::role_distribution),
        )
        .route(
            "/dashboard/user-analytics",
            get(handlers::dashboard::user_analytics),
        )
        .require_permission(state, "dashboard", "read");

    let activity = Router::new()
        .route(
            "/dashboard/recent-activity",
            get(handlers::dashboard::recent_activity),
        )
        .require_permission(state, "activity_logs", "read");

    stats.merge(activity)
}

/// Operator endpoints.
fn system_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/system/health", get(handlers::health::system_health))
        .require_role(state, SYSTEM_ROLES)
}
