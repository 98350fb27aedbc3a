//! Static site configuration

use crate::interval::IntervalMode;
use serde::{Deserialize, Serialize};

/// A site defined statically in the config file, loaded into the registry
/// at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Target URL (must include a scheme)
    pub url: String,
    /// Fixed interval in milliseconds or "smart"; the monitor default
    /// applies when omitted
    #[serde(default)]
    pub interval: Option<IntervalMode>,
    /// Whether polling starts enabled
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_config_fixed_interval() {
        let toml = r#"
            url = "https://example.com"
            interval = 60000
        "#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.interval, Some(IntervalMode::Fixed(60_000)));
        assert!(config.active);
    }

    #[test]
    fn test_site_config_smart_interval() {
        let toml = r#"
            url = "https://example.com"
            interval = "smart"
            active = false
        "#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.interval, Some(IntervalMode::Smart));
        assert!(!config.active);
    }

    #[test]
    fn test_site_config_interval_optional() {
        let toml = r#"url = "https://example.com""#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.interval, None);
    }
}
