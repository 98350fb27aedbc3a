use crate::analyzer::Platform;
use crate::interval::IntervalMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-registered endpoint under monitoring.
///
/// The id is assigned at creation and never changes. Timestamp, platform and
/// expiration fields are updated by every completed check; the active flag
/// and interval mode change only through the configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredSite {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Target URL, normalized to include a scheme by the caller
    pub url: String,
    /// Fixed interval in milliseconds or adaptive "smart" mode
    pub interval: IntervalMode,
    /// Whether the site is being polled
    pub active: bool,
    /// When the last check completed
    pub last_checked: Option<DateTime<Utc>>,
    /// When the next check is scheduled (smart mode only)
    pub next_check: Option<DateTime<Utc>>,
    /// Cache layer observed on the last check
    pub platform: Option<Platform>,
    /// Cache expiration discovered on the last check
    pub cache_expiration: Option<DateTime<Utc>>,
}

impl MonitoredSite {
    /// Create a new site with a fresh UUID and no check history.
    pub fn new(url: String, interval: IntervalMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url,
            interval,
            active: true,
            last_checked: None,
            next_check: None,
            platform: None,
            cache_expiration: None,
        }
    }
}

/// Validation predicate for the configuration surface.
///
/// A monitorable URL parses, uses http or https and names a host. The core
/// itself assumes URLs were validated by the caller; this is the predicate
/// callers are expected to use.
pub fn is_valid_url(input: &str) -> bool {
    match url::Url::parse(input) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}
