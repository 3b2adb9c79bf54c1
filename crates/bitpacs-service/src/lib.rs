//! # bitpacs-service
//!
//! Business logic service layer for BitPacs. Each service orchestrates
//! the facility router, read-through cache, Orthanc client, repositories,
//! and authentication to implement application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod auth;
pub mod dashboard;
pub mod study_log;

pub use auth::{AuthService, LoginRequest, LoginResponse};
pub use dashboard::{DashboardService, ListingEndpoint};
pub use study_log::{RecordStudyLogRequest, StudyLogService, StudyLogStore, UserDirectory};
