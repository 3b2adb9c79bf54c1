//! # bitpacs-cache
//!
//! Time-bounded read-through cache in front of the Orthanc HTTP API,
//! built on [moka](https://crates.io/crates/moka).
//!
//! Concurrent misses on one key collapse into a single upstream fetch
//! (single-flight); a failed fetch degrades into an error-flagged JSON
//! payload instead of propagating, and is never stored.

pub mod keys;
pub mod store;

pub use store::{CachedBody, ReadThroughCache};
