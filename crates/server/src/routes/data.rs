//! Data API route handlers.
//!
//! The front-end loads its whole state with one GET and saves it with one
//! POST. There is no per-entity access.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use startosphere_core::ApiResponse;
use tracing::instrument;

use crate::error::{AppError, INVALID_JSON_MESSAGE, Result};
use crate::state::AppState;

/// Message returned after a successful save.
pub const SAVED_MESSAGE: &str = "Data saved successfully.";

/// Fetch the stored document.
///
/// GET /api/data
///
/// Always 200 with a document; the default one when nothing valid is stored.
#[instrument(skip(state))]
pub async fn fetch(State(state): State<AppState>) -> Result<Response> {
    let document = state.store().load().await;

    let body = serde_json::to_vec(&document)
        .map_err(|e| AppError::Internal(format!("Server error during GET: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Replace the stored document with the request body.
///
/// POST /api/data
///
/// The body is parsed as JSON whatever the `Content-Type`. An empty body,
/// invalid JSON or a bare `null` is a 400 and leaves the file untouched.
/// A body over `max_body_bytes` is a 413 with the same JSON error shape.
#[instrument(skip_all, fields(body_bytes = tracing::field::Empty))]
pub async fn replace(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse>> {
    let body = body.map_err(|rejection| body_error(&state, &rejection))?;
    tracing::Span::current().record("body_bytes", body.len());

    let value = parse_body(&body)
        .ok_or_else(|| AppError::BadRequest(INVALID_JSON_MESSAGE.to_string()))?;

    state.store().save(&value).await?;

    Ok(Json(ApiResponse::success(SAVED_MESSAGE)))
}

/// Map a failed body read onto the JSON error responses.
fn body_error(state: &AppState, rejection: &BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(state.config().max_body_bytes)
    } else {
        tracing::debug!(error = %rejection, "Failed to read request body");
        AppError::BadRequest(INVALID_JSON_MESSAGE.to_string())
    }
}

/// Parse a request body, treating `null` like a missing body.
fn parse_body(body: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON");
            None
        }
    }
}
