//! `AuthUser` extractor: the authenticated caller's context.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt, UserAgent};

use warden_core::error::AppError;
use warden_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
///
/// Reuses the context attached by the `require_auth` layer when present and
/// otherwise validates the bearer token itself.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(AuthUser(ctx.clone()));
        }
        Ok(AuthUser(authenticate(state, &parts.headers)?))
    }
}

/// Validate the `Authorization: Bearer` access token and build the caller's context.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<RequestContext, AppError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::authentication("Missing or invalid Authorization header"))?;

    let claims = state.tokens.validate_access_token(bearer.token())?;
    let user_id = claims.user_id();
    let role = claims
        .role
        .ok_or_else(|| AppError::token_malformed("Access token carries no role"))?;

    Ok(RequestContext::new(
        user_id,
        role,
        client_ip(headers),
        user_agent(headers),
    ))
}

/// The `User-Agent` header, if present and well-formed.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<UserAgent>()
        .map(|ua| ua.as_str().to_string())
}

/// First hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.1"));

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.9"));

        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
