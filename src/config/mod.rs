//! Configuration module for CacheWatch
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CACHEWATCH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use cachewatch::config::CacheWatchConfig;
//!
//! // Load defaults
//! let config = CacheWatchConfig::default();
//! assert_eq!(config.server.port, 8000);
//!
//! // Parse from TOML
//! let toml = r#"
//! [server]
//! port = 9000
//! "#;
//! let config: CacheWatchConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! ```

pub mod error;
pub mod logging;
pub mod persistence;
pub mod server;
pub mod site;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use persistence::PersistenceConfig;
pub use server::ServerConfig;
pub use site::SiteConfig;

// Re-export MonitorConfig from the monitor module
pub use crate::monitor::MonitorConfig;

use crate::registry::is_valid_url;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the CacheWatch server.
///
/// Aggregates all configuration sections: HTTP server, monitoring engine,
/// persistence, logging, and the static site list.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheWatchConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Monitoring engine configuration
    pub monitor: MonitorConfig,
    /// Snapshot persistence configuration
    pub persistence: PersistenceConfig,
    /// Static site definitions
    pub sites: Vec<SiteConfig>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl CacheWatchConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports CACHEWATCH_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("CACHEWATCH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("CACHEWATCH_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("CACHEWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CACHEWATCH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(persist) = std::env::var("CACHEWATCH_PERSISTENCE") {
            self.persistence.enabled = persist.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.monitor.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "monitor.timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        for (i, site) in self.sites.iter().enumerate() {
            if !is_valid_url(&site.url) {
                return Err(ConfigError::Validation {
                    field: format!("sites[{}].url", i),
                    message: format!("not a valid http(s) URL: {}", site.url),
                });
            }
        }

        Ok(())
    }
}
