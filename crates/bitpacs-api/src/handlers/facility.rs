//! Facility listing handler for the dashboard switcher.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::extractors::AuthUser;
use crate::state::AppState;

/// One facility as shown in the switcher.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityView {
    /// Facility key, as sent back in dashboard routes.
    pub key: String,
    /// Display name.
    pub label: String,
    /// Frontend proxy path prefix.
    pub proxy_prefix: String,
    /// Storage capacity in bytes, for usage ratios.
    pub storage_capacity_bytes: u64,
}

/// GET /api/facilities
///
/// Master sees every facility; everyone else sees only the one bound to
/// their account, which keeps the switcher honest about what the router
/// will actually serve.
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<FacilityView>> {
    let facilities = state
        .registry
        .iter()
        .filter(|f| {
            auth.role.can_switch_facility() || f.key.eq_ignore_ascii_case(&auth.facility_key)
        })
        .map(|f| FacilityView {
            key: f.key.clone(),
            label: f.label.clone(),
            proxy_prefix: f.proxy_prefix.clone(),
            storage_capacity_bytes: f.storage_capacity_bytes,
        })
        .collect();
    Json(facilities)
}
