//! HTTP middleware stack for the data server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. Panic catcher (turns handler panics into JSON 500 responses)
//! 3. CORS (any origin, the front-end may be hosted elsewhere)
//! 4. `TraceLayer` (request tracing)
//! 5. Request ID (add unique ID to each request)

pub mod panic;
pub mod request_id;

pub use panic::PanicResponder;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
