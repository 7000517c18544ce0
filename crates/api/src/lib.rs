//! HTTP API for the event attendance portal.
//!
//! Exposed as a library so the integration tests can build the router over
//! in-memory stores; the binary in `main.rs` wires it to the real REST
//! stores.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
