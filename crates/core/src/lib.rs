//! Startosphere Core - Shared types library.
//!
//! This crate provides the types shared by the POS data server and its
//! integration tests:
//! - [`Document`] - the whole persisted application state as one JSON object
//! - [`ApiResponse`] - the `{status, message}` body returned by the data API
//!
//! # Architecture
//!
//! The core crate contains only types - no file I/O and no HTTP. The server
//! crate owns persistence and routing.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
