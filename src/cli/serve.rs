//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{CacheWatchConfig, LogFormat};
use crate::interval::IntervalMode;
use crate::monitor::Monitor;
use crate::persist;
use crate::registry::SiteRegistry;
use crate::stats::StatsStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(args: &ServeArgs) -> anyhow::Result<CacheWatchConfig> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        CacheWatchConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        CacheWatchConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_persistence {
        config.persistence.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(config: &crate::config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Load static sites from configuration into the registry.
///
/// URLs already present (restored from a snapshot) are left alone so a
/// restart does not duplicate them.
pub fn load_sites_from_config(
    config: &CacheWatchConfig,
    registry: &SiteRegistry,
    stats: &StatsStore,
) {
    for site_config in &config.sites {
        if registry.contains_url(&site_config.url) {
            tracing::debug!(url = %site_config.url, "Site already known, skipping config entry");
            continue;
        }

        let interval = site_config
            .interval
            .unwrap_or(IntervalMode::Fixed(config.monitor.default_interval_ms));
        let site = registry.add_site(site_config.url.clone(), interval);
        stats.init_site(&site.id);
        if !site_config.active {
            let _ = registry.set_active(&site.id, false);
        }
        tracing::info!(
            url = %site_config.url,
            interval = %interval,
            active = site_config.active,
            "Loaded static site from config"
        );
    }
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting CacheWatch server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Create registry and stats, restore prior state
    let registry = Arc::new(SiteRegistry::new());
    let stats = Arc::new(StatsStore::new());

    if config.persistence.enabled && config.persistence.state_file.exists() {
        match persist::load(&config.persistence.state_file) {
            Ok(snapshot) => {
                let restored = snapshot.sites.len();
                snapshot.restore(&registry, &stats);
                tracing::info!(sites = restored, "Restored state snapshot");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load state snapshot, starting fresh");
            }
        }
    }

    // 4. Load static sites from config
    load_sites_from_config(&config, &registry, &stats);

    // 5. Build the monitoring engine and arm every active site
    let monitor = Monitor::new(
        Arc::clone(&registry),
        Arc::clone(&stats),
        config.monitor.clone(),
    );
    monitor.resume();

    // 6. Build API router
    let config_arc = Arc::new(config.clone());
    let app_state = Arc::new(AppState::new(
        monitor.clone(),
        Arc::clone(&registry),
        Arc::clone(&stats),
        config_arc,
    ));
    let app = create_router(Arc::clone(&app_state));

    // 7. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "CacheWatch API server listening");

    let cancel_token = CancellationToken::new();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    // 8. Cleanup: stop the engine, persist final state
    monitor.shutdown();
    if config.persistence.enabled {
        if let Err(e) = persist::save(&config.persistence.state_file, &registry, &stats) {
            tracing::warn!(error = %e, "Failed to save state snapshot");
        } else {
            tracing::info!(
                path = %config.persistence.state_file.display(),
                "State snapshot saved"
            );
        }
    }

    tracing::info!("CacheWatch server stopped");
    Ok(())
}
