//! Upstream Orthanc (PACS) configuration and facility registry entries.

use serde::{Deserialize, Serialize};

/// Upstream Orthanc configuration shared by all facilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrthancConfig {
    /// HTTP Basic auth username for the Orthanc REST API.
    pub username: String,
    /// HTTP Basic auth password for the Orthanc REST API.
    pub password: String,
    /// Per-request timeout in seconds. A hung upstream must never block
    /// a caller past this bound; timeouts count as upstream failures.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// The facilities ("unidades") this portal fronts, one Orthanc each.
    #[serde(default)]
    pub facilities: Vec<FacilitySettings>,
}

/// One facility entry: a tenant site backed by its own Orthanc instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySettings {
    /// Short unique facility code (e.g. `"fazenda"`).
    pub key: String,
    /// Human-readable display name.
    pub label: String,
    /// Base URL of this facility's Orthanc instance.
    pub upstream_base_url: String,
    /// Path prefix the frontend uses to reach this facility's proxy.
    #[serde(default)]
    pub proxy_prefix: String,
    /// Total storage capacity in bytes, for dashboard display ratios only.
    #[serde(default)]
    pub storage_capacity_bytes: u64,
}

fn default_request_timeout() -> u64 {
    12
}
