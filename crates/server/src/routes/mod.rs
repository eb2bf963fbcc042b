//! HTTP route handlers for the data server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /           - Front-end entry page (static file)
//! GET  /health     - Health check
//!
//! # Data API
//! GET  /api/data   - Fetch the whole document
//! POST /api/data   - Replace the whole document
//! ```

pub mod data;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware::from_fn,
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{PanicResponder, request_id_middleware};
use crate::state::AppState;

/// Create the data API routes router.
pub fn data_routes() -> Router<AppState> {
    Router::new().route(
        "/api/data",
        get(data::fetch.layer(CatchPanicLayer::custom(PanicResponder::new("GET")))).post(
            data::replace.layer(CatchPanicLayer::custom(PanicResponder::new("POST"))),
        ),
    )
}

/// Build the complete application with middleware applied.
///
/// Sentry layers are left to the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let index = ServeFile::new(&config.index_file);
    let max_body_bytes = config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route_service("/", index)
        .merge(data_routes().layer(DefaultBodyLimit::max(max_body_bytes)))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(PanicResponder::new("request")))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not touch the data file.
async fn health() -> &'static str {
    "ok"
}
