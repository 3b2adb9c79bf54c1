//! Change monitor configuration.

use serde::{Deserialize, Serialize};

/// Settings for the per-facility change-poll monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Whether the server-side monitors run at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds between poll ticks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum number of change records fetched per tick.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_seconds: default_poll_interval(),
            page_limit: default_page_limit(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    5
}

fn default_page_limit() -> u32 {
    100
}
