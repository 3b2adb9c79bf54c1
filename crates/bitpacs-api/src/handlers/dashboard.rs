//! Dashboard handlers: cached Orthanc listings and the changes panel.
//!
//! Listing bodies are passed through verbatim from Orthanc (or the
//! degraded fallback), so these handlers return raw JSON text instead of
//! re-serializing through typed DTOs.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use bitpacs_core::error::AppError;
use bitpacs_service::ListingEndpoint;

use crate::extractors::AuthUser;
use crate::state::AppState;

/// Query parameters for the changes passthrough.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangesParams {
    /// Change sequence to read from.
    #[serde(default)]
    pub since: u64,
    /// Maximum number of changes to return.
    #[serde(default = "default_changes_limit")]
    pub limit: u32,
}

fn default_changes_limit() -> u32 {
    100
}

/// GET /api/dashboard/series/{facility}
pub async fn series(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(facility): Path<String>,
) -> Result<Response, AppError> {
    listing(&state, &auth, &facility, ListingEndpoint::Series).await
}

/// GET /api/dashboard/studies/{facility}
pub async fn studies(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(facility): Path<String>,
) -> Result<Response, AppError> {
    listing(&state, &auth, &facility, ListingEndpoint::Studies).await
}

/// GET /api/dashboard/statistics/{facility}
pub async fn statistics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(facility): Path<String>,
) -> Result<Response, AppError> {
    listing(&state, &auth, &facility, ListingEndpoint::Statistics).await
}

/// GET /api/dashboard/changes/{facility}?since=&limit=
///
/// Uncached passthrough; upstream failures surface as 502 here because
/// the panel polls frequently and can show its own retry state.
pub async fn changes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(facility): Path<String>,
    Query(params): Query<ChangesParams>,
) -> Result<Response, AppError> {
    let body = state
        .dashboard_service
        .fetch_changes(auth.context(), &facility, params.since, params.limit)
        .await?;
    Ok(json_body(body))
}

async fn listing(
    state: &AppState,
    auth: &AuthUser,
    facility: &str,
    endpoint: ListingEndpoint,
) -> Result<Response, AppError> {
    let body = state
        .dashboard_service
        .fetch_listing(auth.context(), facility, endpoint)
        .await?;
    Ok(json_body(body.into_string()))
}

fn json_body(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
