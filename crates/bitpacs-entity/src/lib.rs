//! # bitpacs-entity
//!
//! Domain entity models for BitPacs: users and roles, study audit logs,
//! and the explicit session context passed into routing and services.

pub mod audit;
pub mod session;
pub mod user;

pub use session::SessionContext;
pub use user::Role;
