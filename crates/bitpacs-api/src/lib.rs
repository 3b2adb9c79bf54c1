//! # bitpacs-api
//!
//! HTTP API layer for BitPacs built on Axum.
//!
//! Provides the REST endpoints, extractors, error mapping, and the server
//! runner that wires configuration, database, cache, Orthanc client, and
//! per-facility change monitors together.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::run_server;
pub use state::AppState;
