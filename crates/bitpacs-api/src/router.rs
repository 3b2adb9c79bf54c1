//! Route definitions for the BitPacs HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(facility_routes())
        .merge(dashboard_routes())
        .merge(log_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&state))
        .with_state(state)
}

/// Auth endpoints: login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Facility switcher
fn facility_routes() -> Router<AppState> {
    Router::new().route("/facilities", get(handlers::facility::list))
}

/// Cached listings and changes passthrough
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/dashboard/series/{facility}",
            get(handlers::dashboard::series),
        )
        .route(
            "/dashboard/studies/{facility}",
            get(handlers::dashboard::studies),
        )
        .route(
            "/dashboard/statistics/{facility}",
            get(handlers::dashboard::statistics),
        )
        .route(
            "/dashboard/changes/{facility}",
            get(handlers::dashboard::changes),
        )
}

/// Study access log
fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", post(handlers::logs::record))
        .route("/logs", get(handlers::logs::list_all))
        .route("/logs/user/{id}", get(handlers::logs::list_for_user))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
