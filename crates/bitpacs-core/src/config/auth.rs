//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// JWT authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// JWT issuer claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Email for the bootstrap Master account, created on first start
    /// when the users table is empty.
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,
    /// Password for the bootstrap Master account.
    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

fn default_access_ttl() -> u64 {
    480
}

fn default_issuer() -> String {
    "bitpacs".to_string()
}
