//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use bitpacs_auth::JwtDecoder;
use bitpacs_cache::ReadThroughCache;
use bitpacs_core::config::AppConfig;
use bitpacs_facility::FacilityRegistry;
use bitpacs_service::{AuthService, DashboardService, StudyLogService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Facility registry.
    pub registry: Arc<FacilityRegistry>,
    /// Read-through listing cache.
    pub cache: Arc<ReadThroughCache>,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Login and identity service.
    pub auth_service: Arc<AuthService>,
    /// Dashboard data service.
    pub dashboard_service: Arc<DashboardService>,
    /// Study access log service.
    pub study_log_service: Arc<StudyLogService>,
}
