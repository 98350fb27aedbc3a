//! Site Registry module.
//!
//! Provides thread-safe in-memory storage and querying of monitored sites.

mod error;
mod site;


pub use error::*;
pub use site::*;

use crate::analyzer::Platform;
use crate::interval::IntervalMode;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// The Site Registry stores every monitored site.
///
/// Uses a lock-free concurrent map (DashMap) so check completions and
/// configuration changes can mutate different sites without contending.
/// All updates are if-present: a mutation against a removed id is a no-op
/// error, never a resurrection.
///
/// # Examples
///
/// ```
/// use cachewatch::registry::SiteRegistry;
/// use cachewatch::interval::IntervalMode;
///
/// let registry = SiteRegistry::new();
/// let site = registry.add_site("https://example.com".to_string(), IntervalMode::Smart);
/// assert_eq!(registry.site_count(), 1);
/// assert!(registry.get_site(&site.id).is_some());
/// ```
pub struct SiteRegistry {
    sites: DashMap<String, MonitoredSite>,
}

impl SiteRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sites: DashMap::new(),
        }
    }

    /// Register a new site and return it (with its generated id).
    pub fn add_site(&self, url: String, interval: IntervalMode) -> MonitoredSite {
        let site = MonitoredSite::new(url, interval);
        self.sites.insert(site.id.clone(), site.clone());
        site
    }

    /// Insert a fully-formed site, keeping its existing id.
    ///
    /// Used by the persistence restore path.
    pub fn insert_site(&self, site: MonitoredSite) {
        self.sites.insert(site.id.clone(), site);
    }

    /// Remove a site, returning its final state.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SiteNotFound` if no site with the id exists.
    pub fn remove_site(&self, id: &str) -> Result<MonitoredSite, RegistryError> {
        self.sites
            .remove(id)
            .map(|(_, site)| site)
            .ok_or_else(|| RegistryError::SiteNotFound(id.to_string()))
    }

    /// Get a site by id (cloned copy).
    pub fn get_site(&self, id: &str) -> Option<MonitoredSite> {
        self.sites.get(id).map(|entry| entry.value().clone())
    }

    /// All registered sites (cloned copies).
    pub fn all_sites(&self) -> Vec<MonitoredSite> {
        self.sites.iter().map(|entry| entry.value().clone()).collect()
    }

    /// All sites currently flagged active (cloned copies).
    pub fn active_sites(&self) -> Vec<MonitoredSite> {
        self.sites
            .iter()
            .filter(|entry| entry.value().active)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered sites.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Whether a site url is already registered.
    pub fn contains_url(&self, url: &str) -> bool {
        self.sites.iter().any(|entry| entry.value().url == url)
    }

    /// Flip a site's active flag.
    pub fn set_active(&self, id: &str, active: bool) -> Result<(), RegistryError> {
        let mut site = self
            .sites
            .get_mut(id)
            .ok_or_else(|| RegistryError::SiteNotFound(id.to_string()))?;
        site.active = active;
        Ok(())
    }

    /// Change a site's interval mode.
    pub fn set_interval(&self, id: &str, interval: IntervalMode) -> Result<(), RegistryError> {
        let mut site = self
            .sites
            .get_mut(id)
            .ok_or_else(|| RegistryError::SiteNotFound(id.to_string()))?;
        site.interval = interval;
        Ok(())
    }

    /// Apply the observations of a completed check.
    ///
    /// Sets last-checked, the scheduled next check (smart mode), the observed
    /// platform and the discovered cache expiration in one update.
    pub fn record_check(
        &self,
        id: &str,
        checked_at: DateTime<Utc>,
        next_check: Option<DateTime<Utc>>,
        platform: Platform,
        cache_expiration: Option<DateTime<Utc>>,
    ) -> Result<(), RegistryError> {
        let mut site = self
            .sites
            .get_mut(id)
            .ok_or_else(|| RegistryError::SiteNotFound(id.to_string()))?;
        site.last_checked = Some(checked_at);
        site.next_check = next_check;
        site.platform = Some(platform);
        site.cache_expiration = cache_expiration;
        Ok(())
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
