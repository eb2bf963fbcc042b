//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Every error response is an
//! [`ApiResponse`] body with `"status": "error"`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use startosphere_core::ApiResponse;
use thiserror::Error;

use crate::store::StoreError;

/// Message returned when a save request carries no usable JSON.
pub const INVALID_JSON_MESSAGE: &str = "No JSON data provided or invalid JSON format.";

/// Message returned when the store refuses or fails a save.
pub const WRITE_FAILED_MESSAGE: &str = "Server failed to write data to file.";

/// Application-level error type for the data server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Saving the document failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeded the configured limit, in bytes.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Unexpected failure; the message is sent to the client verbatim.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Store(_) => WRITE_FAILED_MESSAGE.to_string(),
            Self::PayloadTooLarge(limit) => {
                format!("Request body is too large. The limit is {limit} bytes.")
            }
            Self::BadRequest(msg) | Self::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected request");
        }

        (status, Json(ApiResponse::error(self.client_message()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use startosphere_core::ApiStatus;

    use super::*;

    async fn body_of(response: Response) -> ApiResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::Store(StoreError::NotAnObject("array"));
        assert_eq!(
            err.to_string(),
            "Store error: document must be a JSON object, found array"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::PayloadTooLarge(16)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::NotAnObject("null"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_store_error_body_hides_details() {
        let body = body_of(AppError::Store(StoreError::NotAnObject("array")).into_response()).await;
        assert_eq!(body.status, ApiStatus::Error);
        assert_eq!(body.message, WRITE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_payload_too_large_body_is_json() {
        let body = body_of(AppError::PayloadTooLarge(1024).into_response()).await;
        assert_eq!(body.status, ApiStatus::Error);
        assert_eq!(
            body.message,
            "Request body is too large. The limit is 1024 bytes."
        );
    }

    #[tokio::test]
    async fn test_internal_error_body_carries_message() {
        let body = body_of(
            AppError::Internal("Server error during GET: disk on fire".to_string()).into_response(),
        )
        .await;
        assert_eq!(body.status, ApiStatus::Error);
        assert_eq!(body.message, "Server error during GET: disk on fire");
    }
}
