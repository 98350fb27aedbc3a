//! Snapshot persistence configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for state snapshot persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Whether snapshots are loaded at startup and saved at shutdown
    pub enabled: bool,
    /// Snapshot file location
    pub state_file: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            state_file: PathBuf::from("cachewatch-state.json"),
        }
    }
}
