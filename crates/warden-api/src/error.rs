//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use warden_core::error::{AppError, ErrorKind};
use warden_core::types::ApiErrorResponse;

/// Message returned in place of any 5xx error's own text.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// An `AppError` on its way out over HTTP.
///
/// Handlers return `Result<_, ApiError>` and use `?` on service results;
/// the `From` impl does the wrapping.
#[derive(Debug)]
pub struct ApiError {
    inner: AppError,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status for an error kind.
    pub fn status_for(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation | ErrorKind::ResetTokenInvalid => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidCredentials
            | ErrorKind::Authentication
            | ErrorKind::TokenExpired
            | ErrorKind::TokenMalformed
            | ErrorKind::TokenWrongKind => StatusCode::UNAUTHORIZED,
            ErrorKind::AccountDeactivated | ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Configuration
            | ErrorKind::Hashing
            | ErrorKind::Database
            | ErrorKind::Serialization
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self {
            inner,
            details: None,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).ok();
        Self {
            inner: AppError::validation("Request validation failed"),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.inner.kind;
        let status = Self::status_for(kind);

        let body = if kind.is_internal() {
            tracing::error!(kind = %kind, error = %self.inner.message, "Internal server error");
            ApiErrorResponse::new("INTERNAL_ERROR", INTERNAL_MESSAGE)
        } else {
            ApiErrorResponse::new(kind.to_string(), self.inner.message).with_details(self.details)
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::status_for(ErrorKind::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::status_for(ErrorKind::TokenWrongKind),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::status_for(ErrorKind::Authorization),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::status_for(ErrorKind::ResetTokenInvalid),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::status_for(ErrorKind::Configuration),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn test_internal_message_is_hidden() {
        let response = ApiError::from(AppError::database("relation \"users\" does not exist"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], INTERNAL_MESSAGE);
        assert!(!body.to_string().contains("relation"));
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let response = ApiError::from(AppError::conflict("Role name already exists")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_of(response).await["message"], "Role name already exists");
    }
}
