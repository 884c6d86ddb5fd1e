//! Authentication gate for protected route groups.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;
use crate::extractors::auth::authenticate;
use crate::state::AppState;

/// Rejects requests without a valid access token with 401 and otherwise
/// attaches the caller's `RequestContext` to the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(&state, request.headers()).map_err(|e| {
        debug!(path = %request.uri().path(), reason = %e, "Authentication rejected");
        e
    })?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
