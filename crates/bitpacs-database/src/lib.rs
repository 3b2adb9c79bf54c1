//! # bitpacs-database
//!
//! PostgreSQL access for BitPacs: connection pool management, migrations,
//! and the repositories for users and study logs.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{connect, ping};
