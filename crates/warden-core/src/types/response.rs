//! Wire shape of error bodies.

use serde::{Deserialize, Serialize};

/// `{"error": CODE, "message": ..., "details"?: ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach field-level details, if any.
    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_omitted_when_absent() {
        let json = serde_json::to_value(ApiErrorResponse::new("NOT_FOUND", "User not found"))
            .expect("serialize");
        assert_eq!(json, serde_json::json!({"error": "NOT_FOUND", "message": "User not found"}));
    }
}
