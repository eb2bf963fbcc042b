//! Core types for the POS data server.

pub mod document;
pub mod response;

pub use document::{
    COLLECTION_KEYS, DEFAULT_APP_NAME, DEFAULT_CURRENCY, DEFAULT_TAX_RATE, Document,
    REQUIRED_KEY, SETTINGS_KEY, ShapeError, json_kind,
};
pub use response::{ApiResponse, ApiStatus};
