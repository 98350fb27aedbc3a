//! Shared test utilities for CacheWatch integration tests.
//!
//! Provides a programmable stub fetcher and AppState builders to reduce
//! duplication across test files.

#![allow(dead_code)]

use async_trait::async_trait;
use cachewatch::api::AppState;
use cachewatch::config::CacheWatchConfig;
use cachewatch::fetch::{FetchError, FetchedHeaders, HeaderFetcher};
use cachewatch::monitor::{Monitor, MonitorConfig};
use cachewatch::registry::SiteRegistry;
use cachewatch::stats::StatsStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fetcher with scriptable responses, shared by the engine and the proxy
/// endpoint in router tests.
pub struct StubFetcher {
    headers: Mutex<HashMap<String, String>>,
    fail_with: Mutex<Option<String>>,
}

impl StubFetcher {
    pub fn new(headers: HashMap<String, String>) -> Arc<Self> {
        Arc::new(Self {
            headers: Mutex::new(headers),
            fail_with: Mutex::new(None),
        })
    }

    /// Make every subsequent fetch fail with this message.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl HeaderFetcher for StubFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedHeaders, FetchError> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(FetchError::ConnectionFailed(message));
        }
        Ok(FetchedHeaders {
            headers: self.headers.lock().unwrap().clone(),
            response_time_ms: 42,
        })
    }
}

/// Headers of a typical Cloudflare cache hit.
pub fn cloudflare_hit_headers() -> HashMap<String, String> {
    [
        ("cf-cache-status", "HIT"),
        ("cf-ray", "8a1b2c3d-IAD"),
        ("cache-control", "public, max-age=3600"),
        ("age", "120"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Build application state where both the engine and the proxy use `stub`.
pub fn make_state(stub: Arc<StubFetcher>) -> Arc<AppState> {
    let registry = Arc::new(SiteRegistry::new());
    let stats = Arc::new(StatsStore::new());
    let config = Arc::new(CacheWatchConfig::default());
    let monitor = Monitor::with_fetcher(
        Arc::clone(&registry),
        Arc::clone(&stats),
        MonitorConfig::default(),
        stub.clone(),
    );
    Arc::new(AppState::with_fetcher(monitor, registry, stats, config, stub))
}
