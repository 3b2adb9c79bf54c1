//! # bitpacs-pacs
//!
//! Thin HTTP client for the upstream Orthanc REST API. Owns transport
//! details only: Basic auth, the per-request timeout, status mapping, and
//! JSON decoding of the changes feed. Storage, query, and rendering stay
//! on the Orthanc side.

pub mod client;
pub mod types;

pub use client::OrthancClient;
pub use types::{ChangeRecord, ChangesFeed};
