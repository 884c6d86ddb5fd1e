//! Access-decision guards for route groups.
//!
//! Every guard is the same middleware parameterized by an [`AccessRule`].
//! Guards read the context attached by `require_auth`; a request that never
//! authenticated gets 401 before any permission is looked at.

use std::collections::HashMap;

use axum::Router;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use tracing::warn;
use uuid::Uuid;

use warden_auth::rbac::PermissionResolver;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::UserId;
use warden_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// What a caller must satisfy to pass a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// The caller's role grants `action` on `resource`.
    Permission {
        resource: &'static str,
        action: &'static str,
    },
    /// The caller holds one of the listed roles.
    AnyRole(&'static [&'static str]),
    /// The `{id}` path segment is the caller, or the caller's role grants
    /// `action` on `resource`.
    SelfOrPermission {
        resource: &'static str,
        action: &'static str,
    },
}

impl AccessRule {
    fn denial(&self) -> &'static str {
        match self {
            Self::AnyRole(_) => "Insufficient role",
            Self::Permission { .. } | Self::SelfOrPermission { .. } => "Insufficient permissions",
        }
    }
}

/// Decide `rule` for `ctx`. `target` is the user named by the path, if any.
///
/// Roles and permissions are read from the store, so a role change takes
/// effect on the next request.
pub async fn enforce(
    resolver: &PermissionResolver,
    ctx: &RequestContext,
    rule: AccessRule,
    target: Option<UserId>,
) -> AppResult<()> {
    let decision = match rule {
        AccessRule::Permission { resource, action } => {
            resolver.check_permission(ctx.user_id, resource, action).await
        }
        AccessRule::AnyRole(roles) => resolver.has_any_role(ctx.user_id, roles).await,
        AccessRule::SelfOrPermission { resource, action } => {
            if target.is_some_and(|id| ctx.is_self(id)) {
                Ok(true)
            } else {
                resolver.check_permission(ctx.user_id, resource, action).await
            }
        }
    };

    let allowed = decision.map_err(|e| {
        if e.is(ErrorKind::NotFound) {
            AppError::authentication("User no longer exists")
        } else {
            e
        }
    })?;

    if !allowed {
        warn!(user_id = %ctx.user_id, rule = ?rule, "Access denied");
        return Err(AppError::forbidden(rule.denial()));
    }
    Ok(())
}

#[derive(Clone)]
struct Guard {
    state: AppState,
    rule: AccessRule,
}

async fn authorize(
    State(guard): State<Guard>,
    path: Result<Path<HashMap<String, String>>, PathRejection>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(ctx) = request.extensions().get::<RequestContext>() else {
        return Err(AppError::authentication("Authentication required").into());
    };

    let target = path
        .ok()
        .and_then(|Path(params)| params.get("id").and_then(|id| Uuid::parse_str(id).ok()))
        .map(UserId::from_uuid);

    enforce(&guard.state.resolver, ctx, guard.rule, target).await?;
    Ok(next.run(request).await)
}

/// Guard layers for `Router<AppState>`.
///
/// Each call wraps the routes registered so far. Add authorization guards
/// on the individual groups and authentication last on the merged router,
/// so authentication runs first.
pub trait RouteGuards: Sized {
    /// Require a valid access token.
    fn require_auth(self, state: &AppState) -> Self;
    /// Require an arbitrary rule.
    fn guard(self, state: &AppState, rule: AccessRule) -> Self;

    /// Require `action` on `resource`.
    fn require_permission(self, state: &AppState, resource: &'static str, action: &'static str) -> Self {
        self.guard(state, AccessRule::Permission { resource, action })
    }

    /// Require one of `roles`.
    fn require_role(self, state: &AppState, roles: &'static [&'static str]) -> Self {
        self.guard(state, AccessRule::AnyRole(roles))
    }

    /// Allow the user named by `{id}`, otherwise require `action` on `resource`.
    fn self_or_permission(self, state: &AppState, resource: &'static str, action: &'static str) -> Self {
        self.guard(state, AccessRule::SelfOrPermission { resource, action })
    }
}

impl RouteGuards for Router<AppState> {
    fn require_auth(self, state: &AppState) -> Self {
        self.route_layer(middleware::from_fn_with_state(
            state.clone(),
            super::auth::require_auth,
        ))
    }

    fn guard(self, state: &AppState, rule: AccessRule) -> Self {
        self.route_layer(middleware::from_fn_with_state(
            Guard {
                state: state.clone(),
                rule,
            },
            authorize,
        ))
    }
}
