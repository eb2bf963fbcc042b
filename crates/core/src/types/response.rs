//! Status bodies returned by the data API.

use serde::{Deserialize, Serialize};

/// Outcome marker carried in every status body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// `{"status": ..., "message": ...}` body sent for saves and for every error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ApiStatus,
    pub message: String,
}

impl ApiResponse {
    /// Build a success body.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
        }
    }

    /// Build an error body.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            message: message.into(),
        }
    }

    /// Returns `true` for a success body.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ApiStatus::Success
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wire_format() {
        let body = serde_json::to_value(ApiResponse::success("Data saved successfully.")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "success", "message": "Data saved successfully."})
        );
    }

    #[test]
    fn test_error_wire_format() {
        let body = serde_json::to_value(ApiResponse::error("boom")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn test_parse_error_body() {
        let parsed: ApiResponse =
            serde_json::from_str(r#"{"status":"error","message":"nope"}"#).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.message, "nope");
    }
}
