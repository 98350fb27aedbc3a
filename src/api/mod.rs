//! # HTTP API surface
//!
//! Endpoints consumed by the external dashboard UI.
//!
//! ## Endpoints
//!
//! - `GET /api/check?url=…` - Stateless header-fetch proxy
//! - `GET /api/sites` / `POST /api/sites` - List and register sites
//! - `DELETE /api/sites/:id` / `PATCH /api/sites/:id` - Remove and reconfigure
//! - `GET /api/sites/:id/stats` / `GET /api/stats` - Monitoring statistics
//! - `POST /api/refresh`, `POST /api/pause`, `POST /api/resume` - Engine ops
//! - `GET /health` - Engine status
//!
//! ## Example
//!
//! ```no_run
//! use cachewatch::api::{AppState, create_router};
//! use cachewatch::config::CacheWatchConfig;
//! use cachewatch::monitor::{Monitor, MonitorConfig};
//! use cachewatch::registry::SiteRegistry;
//! use cachewatch::stats::StatsStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(SiteRegistry::new());
//! let stats = Arc::new(StatsStore::new());
//! let config = Arc::new(CacheWatchConfig::default());
//! let monitor = Monitor::new(Arc::clone(&registry), Arc::clone(&stats), MonitorConfig::default());
//!
//! let state = Arc::new(AppState::new(monitor, registry, stats, config));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod check;
mod health;
mod sites;
pub mod types;

pub use types::*;

use crate::config::CacheWatchConfig;
use crate::fetch::{HeaderFetcher, HttpHeaderFetcher};
use crate::monitor::Monitor;
use crate::registry::SiteRegistry;
use crate::stats::StatsStore;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

/// Maximum request body size (64 KB); site payloads are tiny.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub monitor: Monitor,
    pub registry: Arc<SiteRegistry>,
    pub stats: Arc<StatsStore>,
    pub config: Arc<CacheWatchConfig>,
    /// Fetcher used by the proxy endpoint (independent of the engine's)
    pub fetcher: Arc<dyn HeaderFetcher>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state with the default proxy fetcher.
    pub fn new(
        monitor: Monitor,
        registry: Arc<SiteRegistry>,
        stats: Arc<StatsStore>,
        config: Arc<CacheWatchConfig>,
    ) -> Self {
        Self::with_fetcher(
            monitor,
            registry,
            stats,
            config,
            Arc::new(HttpHeaderFetcher::new()),
        )
    }

    /// Create application state with a custom proxy fetcher (for testing).
    pub fn with_fetcher(
        monitor: Monitor,
        registry: Arc<SiteRegistry>,
        stats: Arc<StatsStore>,
        config: Arc<CacheWatchConfig>,
        fetcher: Arc<dyn HeaderFetcher>,
    ) -> Self {
        Self {
            monitor,
            registry,
            stats,
            config,
            fetcher,
            start_time: Instant::now(),
        }
    }
}

/// Create the main API router with all endpoints configured.
///
/// CORS is permissive: the dashboard UI is served from another origin, and
/// the original proxy answered with `Access-Control-Allow-Origin: *`.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::handle))
        .route("/api/check", get(check::handle))
        .route("/api/sites", get(sites::list).post(sites::add))
        .route("/api/sites/:id", delete(sites::remove).patch(sites::update))
        .route("/api/sites/:id/stats", get(sites::site_stats))
        .route("/api/stats", get(sites::all_stats))
        .route("/api/refresh", post(sites::refresh))
        .route("/api/pause", post(sites::pause))
        .route("/api/resume", post(sites::resume))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
