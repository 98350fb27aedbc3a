//! Configuration for the monitoring engine.

use serde::{Deserialize, Serialize};

/// Configuration for site monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Timeout for each header fetch, in seconds
    pub timeout_seconds: u64,
    /// Fixed interval (ms) assigned to config-loaded sites that omit one
    pub default_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            default_interval_ms: 60_000,
        }
    }
}
