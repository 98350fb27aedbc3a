//! Monitoring engine: per-site scheduling and the engine facade.
//!
//! Each active site owns at most one pending check at a time, modeled as a
//! cancellable delayed task. A check cycle sleeps, fetches headers,
//! classifies them, records the result and re-arms itself. Configuration
//! changes (removal, deactivation, interval changes, pause) cancel the
//! pending task synchronously through its token; a generation number per
//! armed cycle keeps manual refreshes from ever leaving two timers armed
//! for the same site.

mod config;


pub use config::*;

use crate::analyzer::{classify, estimate_expiration, relevant_headers};
use crate::fetch::{HeaderFetcher, HttpHeaderFetcher};
use crate::interval::{smart_delay, IntervalMode, DEFAULT_SMART_DELAY_MS};
use crate::registry::{MonitoredSite, RegistryError, SiteRegistry};
use crate::stats::{CacheCheckResult, StatsStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Handle for a site's pending check.
///
/// The token cancels the sleeping task; the generation identifies which
/// cycle currently owns the site's slot, so a superseded cycle never re-arms.
struct ArmedCheck {
    token: CancellationToken,
    generation: u64,
}

/// The monitoring engine.
///
/// Owns the site collection, per-site statistics and timer handles, and the
/// process-wide run/pause state. Cloning is cheap; all clones share state.
#[derive(Clone)]
pub struct Monitor {
    registry: Arc<SiteRegistry>,
    stats: Arc<StatsStore>,
    fetcher: Arc<dyn HeaderFetcher>,
    config: MonitorConfig,
    /// Pending check per site; absence means Idle
    timers: Arc<DashMap<String, ArmedCheck>>,
    /// Serializes checks within one site; cross-site checks stay concurrent
    check_locks: Arc<DashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    generation: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl Monitor {
    /// Create a monitor with the default HTTP header fetcher.
    pub fn new(registry: Arc<SiteRegistry>, stats: Arc<StatsStore>, config: MonitorConfig) -> Self {
        Self::with_fetcher(registry, stats, config, Arc::new(HttpHeaderFetcher::new()))
    }

    /// Create a monitor with a custom fetcher (for testing or proxying).
    pub fn with_fetcher(
        registry: Arc<SiteRegistry>,
        stats: Arc<StatsStore>,
        config: MonitorConfig,
        fetcher: Arc<dyn HeaderFetcher>,
    ) -> Self {
        Self {
            registry,
            stats,
            fetcher,
            config,
            timers: Arc::new(DashMap::new()),
            check_locks: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(true)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Whether the engine is running (vs. paused).
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a site currently has a pending check.
    pub fn is_armed(&self, site_id: &str) -> bool {
        self.timers.contains_key(site_id)
    }

    /// Register a site and, when the engine is running, check it immediately.
    pub fn add_site(&self, url: String, interval: IntervalMode) -> MonitoredSite {
        let site = self.registry.add_site(url, interval);
        self.stats.init_site(&site.id);
        if self.is_running() && site.active {
            self.arm(&site.id, Duration::ZERO);
        }
        tracing::info!(
            site_id = %site.id,
            url = %site.url,
            interval = %site.interval,
            "Site added"
        );
        site
    }

    /// Remove a site, cancelling its pending check before returning.
    ///
    /// An in-flight check for the site finds no registry slot when it
    /// completes and its result is discarded.
    pub fn remove_site(&self, site_id: &str) -> Result<MonitoredSite, RegistryError> {
        self.disarm(site_id);
        let site = self.registry.remove_site(site_id)?;
        self.stats.remove_site(site_id);
        self.check_locks.remove(site_id);
        tracing::info!(site_id = %site_id, url = %site.url, "Site removed");
        Ok(site)
    }

    /// Activate or deactivate a site.
    ///
    /// Deactivation cancels the pending check synchronously; reactivation
    /// re-arms it (immediately for a never-checked site).
    pub fn set_active(&self, site_id: &str, active: bool) -> Result<(), RegistryError> {
        self.registry.set_active(site_id, active)?;
        if active {
            if self.is_running() {
                if let Some(site) = self.registry.get_site(site_id) {
                    self.arm(site_id, resume_delay(&site, Utc::now()));
                }
            }
        } else {
            self.disarm(site_id);
        }
        tracing::debug!(site_id = %site_id, active, "Site activity changed");
        Ok(())
    }

    /// Change a site's interval mode, re-arming under the new cadence.
    pub fn set_interval(&self, site_id: &str, interval: IntervalMode) -> Result<(), RegistryError> {
        self.registry.set_interval(site_id, interval)?;
        if self.is_running() {
            if let Some(site) = self.registry.get_site(site_id) {
                if site.active {
                    let delay = match site.interval {
                        IntervalMode::Fixed(ms) => Duration::from_millis(ms),
                        IntervalMode::Smart => smart_delay(site.cache_expiration, Utc::now()),
                    };
                    self.arm(site_id, delay);
                }
            }
        }
        Ok(())
    }

    /// Pause monitoring: cancel every pending check, leave all data intact.
    pub fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
        for entry in self.timers.iter() {
            entry.value().token.cancel();
        }
        self.timers.clear();
        tracing::info!("Monitoring paused");
    }

    /// Resume monitoring: re-arm every active site.
    ///
    /// A site that has never been checked, or a smart-mode site with no
    /// established next check, checks immediately. A stored next-check time
    /// already in the past also means "check immediately", never a negative
    /// timer.
    pub fn resume(&self) {
        self.running.store(true, Ordering::SeqCst);
        let now = Utc::now();
        let sites = self.registry.active_sites();
        let count = sites.len();
        for site in sites {
            self.arm(&site.id, resume_delay(&site, now));
        }
        tracing::info!(sites = count, "Monitoring resumed");
    }

    /// Check every active site now, out of band.
    ///
    /// Each site's pending timer is replaced; the normal re-arm logic runs
    /// after the manual check completes, so the regular cadence continues.
    pub fn refresh_all(&self) {
        let sites = self.registry.active_sites();
        tracing::debug!(sites = sites.len(), "Manual refresh of all active sites");
        for site in sites {
            self.arm(&site.id, Duration::ZERO);
        }
    }

    /// Stop the engine: cancel all pending and in-flight checks.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.cancel();
        self.timers.clear();
        tracing::info!("Monitoring engine stopped");
    }

    /// Arm a new check cycle for a site, replacing any pending one.
    fn arm(&self, site_id: &str, delay: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.shutdown.child_token();
        if let Some(previous) = self.timers.insert(
            site_id.to_string(),
            ArmedCheck {
                token: token.clone(),
                generation,
            },
        ) {
            previous.token.cancel();
        }
        self.spawn_cycle(site_id.to_string(), delay, token, generation);
    }

    /// Cancel a site's pending check. Idempotent: cancelling an already
    /// fired or already cancelled timer is a no-op.
    fn disarm(&self, site_id: &str) {
        if let Some((_, armed)) = self.timers.remove(site_id) {
            armed.token.cancel();
        }
    }

    /// Re-arm after a completed cycle, but only if that cycle still owns the
    /// site's slot. The entry lock makes the check-and-replace atomic against
    /// concurrent arms.
    fn rearm_if_current(&self, site_id: &str, generation: u64, delay: Duration) {
        use dashmap::mapref::entry::Entry;
        match self.timers.entry(site_id.to_string()) {
            Entry::Occupied(mut entry) if entry.get().generation == generation => {
                let next_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                let token = self.shutdown.child_token();
                entry.insert(ArmedCheck {
                    token: token.clone(),
                    generation: next_generation,
                });
                drop(entry);
                self.spawn_cycle(site_id.to_string(), delay, token, next_generation);
            }
            _ => {}
        }
    }

    /// Drop a cycle's slot entry if it still owns it.
    fn clear_timer(&self, site_id: &str, generation: u64) {
        self.timers
            .remove_if(site_id, |_, armed| armed.generation == generation);
    }

    fn check_lock(&self, site_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.check_locks
            .entry(site_id.to_string())
            .or_default()
            .clone()
    }

    fn spawn_cycle(
        &self,
        site_id: String,
        delay: Duration,
        token: CancellationToken,
        generation: u64,
    ) {
        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.run_cycle(site_id, delay, token, generation).await;
        });
    }

    /// One full check cycle: sleep, fetch, classify, record, re-arm.
    async fn run_cycle(
        self,
        site_id: String,
        delay: Duration,
        token: CancellationToken,
        generation: u64,
    ) {
        if !delay.is_zero() {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        // Within one site checks are strictly sequential
        let lock = self.check_lock(&site_id);
        let _serial = lock.lock().await;
        if token.is_cancelled() {
            return;
        }

        let Some(site) = self.registry.get_site(&site_id).filter(|s| s.active) else {
            self.clear_timer(&site_id, generation);
            return;
        };

        tracing::debug!(site_id = %site_id, url = %site.url, "Checking site");
        let (result, expiration) = self.perform_check(&site).await;

        // Apply only while the site still exists and is active; a result
        // arriving after removal or deactivation is dropped.
        let Some(site) = self.registry.get_site(&site_id).filter(|s| s.active) else {
            tracing::debug!(site_id = %site_id, "Discarding late check result");
            self.clear_timer(&site_id, generation);
            return;
        };

        let checked_at = result.timestamp;
        let platform = result.platform;
        let verdict = result.verdict;
        let is_error = result.is_error;
        self.stats.record(&site_id, result);
        tracing::debug!(
            site_id = %site_id,
            ?platform,
            ?verdict,
            is_error,
            "Check recorded"
        );

        // Failed fetches yield no headers to adapt from; smart mode falls
        // back to its default cadence until the next good response.
        let next_delay = match site.interval {
            IntervalMode::Fixed(ms) => Duration::from_millis(ms),
            IntervalMode::Smart if is_error => Duration::from_millis(DEFAULT_SMART_DELAY_MS),
            IntervalMode::Smart => smart_delay(expiration, Utc::now()),
        };
        let next_check = if site.interval.is_smart() {
            chrono::Duration::from_std(next_delay)
                .ok()
                .map(|d| Utc::now() + d)
        } else {
            None
        };
        let _ = self
            .registry
            .record_check(&site_id, checked_at, next_check, platform, expiration);

        if self.is_running() {
            self.rearm_if_current(&site_id, generation, next_delay);
        } else {
            self.clear_timer(&site_id, generation);
        }
    }

    /// Fetch and classify one site. Transport failures become error results;
    /// there is no failure path that stops the cycle.
    async fn perform_check(
        &self,
        site: &MonitoredSite,
    ) -> (CacheCheckResult, Option<DateTime<Utc>>) {
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        match self.fetcher.fetch(&site.url, timeout).await {
            Ok(fetched) => {
                let headers = relevant_headers(&fetched.headers);
                let analysis = classify(&headers);
                let now = Utc::now();
                let expiration = estimate_expiration(&headers, now);
                (
                    CacheCheckResult {
                        site_id: site.id.clone(),
                        timestamp: now,
                        headers,
                        platform: analysis.platform,
                        verdict: analysis.verdict,
                        response_time_ms: fetched.response_time_ms,
                        is_error: false,
                        error_message: None,
                    },
                    expiration,
                )
            }
            Err(e) => {
                tracing::warn!(
                    site_id = %site.id,
                    url = %site.url,
                    error = %e,
                    "Header fetch failed"
                );
                (
                    CacheCheckResult::transport_error(site.id.clone(), Utc::now(), e.to_string()),
                    None,
                )
            }
        }
    }
}

/// Delay to use when (re-)arming a site outside the normal cycle.
fn resume_delay(site: &MonitoredSite, now: DateTime<Utc>) -> Duration {
    // Never checked, or smart mode with no established next check: now
    if site.last_checked.is_none() {
        return Duration::ZERO;
    }
    if site.interval.is_smart() && site.next_check.is_none() {
        return Duration::ZERO;
    }
    if let Some(next) = site.next_check {
        // A next-check time in the past means "check immediately"
        return (next - now).to_std().unwrap_or(Duration::ZERO);
    }
    match site.interval {
        IntervalMode::Fixed(ms) => Duration::from_millis(ms),
        IntervalMode::Smart => smart_delay(site.cache_expiration, now),
    }
}
