//! Monitoring statistics module.
//!
//! Keeps a bounded per-site history of check results and the rates derived
//! from it. Statistics are recomputed in full on every append; with the
//! history capped at 100 entries that is cheaper than getting incremental
//! decay right.

#[cfg(test)]
mod tests;

use crate::analyzer::{Platform, Verdict};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Maximum number of historical entries kept per site.
pub const MAX_HISTORY: usize = 100;

/// Outcome of one poll of one site.
///
/// Immutable once produced. Transport failures still yield a result, with the
/// error flag set and verdict/platform unknown, so history shows the gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCheckResult {
    /// Owning site id
    pub site_id: String,
    /// When the check completed
    pub timestamp: DateTime<Utc>,
    /// Cache-relevant subset of the response headers (lowercased names)
    pub headers: HashMap<String, String>,
    /// Cache layer that served the response
    pub platform: Platform,
    /// Cache verdict; never absent, unknown when undeterminable
    pub verdict: Verdict,
    /// Round-trip time in milliseconds
    pub response_time_ms: u64,
    /// True when the fetch failed at the transport layer
    pub is_error: bool,
    /// Human-readable failure description, present iff `is_error`
    pub error_message: Option<String>,
}

impl CacheCheckResult {
    /// Build a transport-failure result for a site.
    pub fn transport_error(site_id: String, timestamp: DateTime<Utc>, message: String) -> Self {
        Self {
            site_id,
            timestamp,
            headers: HashMap::new(),
            platform: Platform::Unknown,
            verdict: Verdict::Unknown,
            response_time_ms: 0,
            is_error: true,
            error_message: Some(message),
        }
    }
}

/// Rolling statistics for one site, derived from its bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    /// Owning site id
    pub site_id: String,
    /// Percentage of hits over the whole retained history
    pub hit_rate: f64,
    /// Complement of the hit rate (0 when history is empty)
    pub miss_rate: f64,
    /// Mean response time over entries with a positive response time
    pub avg_response_time_ms: f64,
    /// Check results, most recent first, capped at [`MAX_HISTORY`]
    pub history: VecDeque<CacheCheckResult>,
}

impl SiteStats {
    pub fn new(site_id: String) -> Self {
        Self {
            site_id,
            hit_rate: 0.0,
            miss_rate: 0.0,
            avg_response_time_ms: 0.0,
            history: VecDeque::new(),
        }
    }

    /// Most recent result, if any checks have completed.
    pub fn last_result(&self) -> Option<&CacheCheckResult> {
        self.history.front()
    }

    /// Prepend a result, evict beyond the cap, recompute derived rates.
    pub fn record(&mut self, result: CacheCheckResult) {
        self.history.push_front(result);
        self.history.truncate(MAX_HISTORY);
        self.recompute();
    }

    fn recompute(&mut self) {
        let total = self.history.len();
        if total == 0 {
            self.hit_rate = 0.0;
            self.miss_rate = 0.0;
            self.avg_response_time_ms = 0.0;
            return;
        }

        let hits = self
            .history
            .iter()
            .filter(|r| r.verdict == Verdict::Hit)
            .count();
        self.hit_rate = hits as f64 / total as f64 * 100.0;
        self.miss_rate = 100.0 - self.hit_rate;

        // Failed fetches report a zero response time; they carry no timing
        // signal and are excluded from the mean.
        let timed: Vec<u64> = self
            .history
            .iter()
            .filter(|r| r.response_time_ms > 0)
            .map(|r| r.response_time_ms)
            .collect();
        self.avg_response_time_ms = if timed.is_empty() {
            0.0
        } else {
            timed.iter().sum::<u64>() as f64 / timed.len() as f64
        };
    }
}

/// Thread-safe store of per-site statistics.
///
/// `record` is deliberately if-present: a result arriving after its site was
/// removed finds no slot and is dropped, so late completions cannot
/// resurrect statistics for a deleted site.
pub struct StatsStore {
    stats: DashMap<String, SiteStats>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self {
            stats: DashMap::new(),
        }
    }

    /// Create an empty stats slot for a newly added site.
    pub fn init_site(&self, site_id: &str) {
        self.stats
            .entry(site_id.to_string())
            .or_insert_with(|| SiteStats::new(site_id.to_string()));
    }

    /// Insert fully-formed stats, keeping their site id.
    ///
    /// Used by the persistence restore path.
    pub fn insert_stats(&self, stats: SiteStats) {
        self.stats.insert(stats.site_id.clone(), stats);
    }

    /// Drop the slot for a removed site.
    pub fn remove_site(&self, site_id: &str) {
        self.stats.remove(site_id);
    }

    /// Record a result into its site's slot.
    ///
    /// Returns false (and records nothing) when the site has no slot, i.e.
    /// it was removed while the check was in flight.
    pub fn record(&self, site_id: &str, result: CacheCheckResult) -> bool {
        match self.stats.get_mut(site_id) {
            Some(mut stats) => {
                stats.record(result);
                true
            }
            None => false,
        }
    }

    /// Statistics for one site (cloned copy).
    pub fn get(&self, site_id: &str) -> Option<SiteStats> {
        self.stats.get(site_id).map(|entry| entry.value().clone())
    }

    /// All statistics keyed by site id (cloned copies).
    pub fn snapshot(&self) -> HashMap<String, SiteStats> {
        self.stats
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of tracked sites.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// True when no sites are tracked.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}
