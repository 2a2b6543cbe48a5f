//! HTTP surface for character-profile generation.
//!
//! Exposes configuration, state, error mapping and the router so the binary
//! entrypoint and integration tests build the same application.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
