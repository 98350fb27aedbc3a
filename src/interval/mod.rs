//! Polling interval policy.
//!
//! Sites poll either at a fixed user-chosen interval or in "smart" mode,
//! where the next delay is derived from the cache expiration discovered on
//! the previous check.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Delay used when no expiration is known (or it has already passed).
pub const DEFAULT_SMART_DELAY_MS: u64 = 30_000;

/// Smart-mode floor: never poll faster than this.
pub const MIN_SMART_DELAY_MS: u64 = 5_000;

/// Smart-mode ceiling: never wait longer than this.
pub const MAX_SMART_DELAY_MS: u64 = 300_000;

/// Below this much remaining lifetime the poll cadence tightens.
const NEAR_EXPIRY_WINDOW_MS: i64 = 60_000;

/// How often a site is re-checked.
///
/// A tagged union rather than a numeric sentinel: a literal interval of N ms
/// and "compute adaptively" are distinct variants. On the wire this is a bare
/// millisecond count or the string `"smart"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalMode {
    /// Fixed interval in milliseconds, used verbatim (no clamping).
    Fixed(u64),
    /// Adaptive interval derived from the discovered cache expiration.
    Smart,
}

impl IntervalMode {
    pub fn is_smart(&self) -> bool {
        matches!(self, IntervalMode::Smart)
    }
}

impl fmt::Display for IntervalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalMode::Fixed(ms) => write!(f, "{}ms", ms),
            IntervalMode::Smart => write!(f, "smart"),
        }
    }
}

impl Serialize for IntervalMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IntervalMode::Fixed(ms) => serializer.serialize_u64(*ms),
            IntervalMode::Smart => serializer.serialize_str("smart"),
        }
    }
}

struct IntervalModeVisitor;

impl<'de> Visitor<'de> for IntervalModeVisitor {
    type Value = IntervalMode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an interval in milliseconds or the string \"smart\"")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(IntervalMode::Fixed(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(IntervalMode::Fixed)
            .map_err(|_| E::custom("interval must be non-negative"))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if value.eq_ignore_ascii_case("smart") {
            Ok(IntervalMode::Smart)
        } else {
            Err(E::custom(format!("unknown interval mode: {value}")))
        }
    }
}

impl<'de> Deserialize<'de> for IntervalMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntervalModeVisitor)
    }
}

/// Compute the next smart-mode delay from the discovered expiration.
///
/// Clamped to [`MIN_SMART_DELAY_MS`], [`MAX_SMART_DELAY_MS`]. Close to
/// expiration the cadence tightens to half the remaining time; far from it a
/// quarter of the remaining time is enough.
pub fn smart_delay(expiration: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    let Some(expiration) = expiration else {
        return Duration::from_millis(DEFAULT_SMART_DELAY_MS);
    };

    let remaining_ms = (expiration - now).num_milliseconds();
    if remaining_ms <= 0 {
        // Already expired: fall back to the default cadence
        return Duration::from_millis(DEFAULT_SMART_DELAY_MS);
    }
    let remaining_ms = remaining_ms as u64;

    let delay_ms = if remaining_ms < NEAR_EXPIRY_WINDOW_MS as u64 {
        (remaining_ms / 2).clamp(MIN_SMART_DELAY_MS, DEFAULT_SMART_DELAY_MS)
    } else {
        (remaining_ms / 4).clamp(MIN_SMART_DELAY_MS, MAX_SMART_DELAY_MS)
    };

    Duration::from_millis(delay_ms)
}
