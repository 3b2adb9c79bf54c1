//! Read-through cache configuration.

use serde::{Deserialize, Serialize};

/// In-memory read-through cache configuration.
///
/// The 5 minute TTL is a policy constant for series/statistics listings:
/// it matches the refresh cadence the upstream Orthanc servers can sustain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// TTL for cached listing bodies in seconds.
    #[serde(default = "default_ttl")]
    pub time_to_live_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            time_to_live_seconds: default_ttl(),
        }
    }
}

fn default_max_capacity() -> u64 {
    1000
}

fn default_ttl() -> u64 {
    300
}
