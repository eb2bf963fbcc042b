//! Convert handler panics into JSON error responses.
//!
//! Used with `tower_http::catch_panic::CatchPanicLayer` so a bug in a handler
//! yields a 500 with the panic text in the body instead of a dropped
//! connection.

use std::any::Any;

use axum::{
    Json,
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use startosphere_core::ApiResponse;
use tower_http::catch_panic::ResponseForPanic;

/// Builds the `{"status": "error"}` body for a caught panic.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    operation: &'static str,
}

impl PanicResponder {
    /// `operation` names what was running, e.g. `"GET"` or `"POST"`.
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self { operation }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let detail = panic_message(err.as_ref());
        tracing::error!(operation = self.operation, panic = %detail, "Handler panicked");

        let message = format!("Server error during {}: {detail}", self.operation);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(message)),
        )
            .into_response()
    }
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}
