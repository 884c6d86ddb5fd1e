//! Typed `{id}` path parameters.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::types::{RoleId, UserId};

use crate::error::ApiError;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid UUID: {s}")))
}

async fn single_uuid<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Uuid, ApiError> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
        .await
        .map_err(|e| AppError::validation(format!("Invalid path: {}", e.body_text())))?;
    Ok(parse_uuid(&raw)?)
}

/// `{id}` as a [`UserId`].
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for UserIdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(UserId::from_uuid(single_uuid(parts, state).await?)))
    }
}

/// `{id}` as a [`RoleId`].
#[derive(Debug, Clone, Copy)]
pub struct RoleIdPath(pub RoleId);

impl<S: Send + Sync> FromRequestParts<S> for RoleIdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(RoleId::from_uuid(single_uuid(parts, state).await?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
    }
}
