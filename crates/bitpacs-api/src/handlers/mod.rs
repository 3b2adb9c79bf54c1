//! HTTP handlers, organized by domain.

pub mod auth;
pub mod dashboard;
pub mod facility;
pub mod health;
pub mod logs;
