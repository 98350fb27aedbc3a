//! State snapshot persistence.
//!
//! The full site list and per-site statistics serialize to a single JSON
//! document and restore verbatim, timestamps included. The serve command
//! loads a snapshot at startup and writes one on graceful shutdown; any
//! other persistence collaborator can consume the same format.

use crate::registry::{MonitoredSite, SiteRegistry};
use crate::stats::{SiteStats, StatsStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while saving or loading snapshots.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Serializable view of the whole engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sites: Vec<MonitoredSite>,
    pub stats: HashMap<String, SiteStats>,
}

impl Snapshot {
    /// Capture the current registry and statistics.
    pub fn capture(registry: &SiteRegistry, stats: &StatsStore) -> Self {
        Self {
            sites: registry.all_sites(),
            stats: stats.snapshot(),
        }
    }

    /// Load everything back into a registry and stats store.
    ///
    /// Every restored site gets a stats slot even if the snapshot carries
    /// none for it.
    pub fn restore(self, registry: &SiteRegistry, stats: &StatsStore) {
        for site in self.sites {
            stats.init_site(&site.id);
            registry.insert_site(site);
        }
        for (_, site_stats) in self.stats {
            stats.insert_stats(site_stats);
        }
    }
}

/// Write a snapshot of the current state to `path` as pretty JSON.
pub fn save(
    path: &Path,
    registry: &SiteRegistry,
    stats: &StatsStore,
) -> Result<(), PersistError> {
    let snapshot = Snapshot::capture(registry, stats);
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), sites = snapshot.sites.len(), "State snapshot saved");
    Ok(())
}

/// Read a snapshot from `path`.
pub fn load(path: &Path) -> Result<Snapshot, PersistError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
