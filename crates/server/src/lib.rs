//! Startosphere POS data server library.
//!
//! Persists the point-of-sale front-end's whole state as one JSON document
//! and exposes it over HTTP. The library form lets the integration tests
//! boot the exact router the binary serves.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
