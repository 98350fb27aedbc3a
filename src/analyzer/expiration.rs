//! Cache expiration estimation from response headers.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Estimate the absolute instant at which the cached response expires.
///
/// Preference order: `max-age=<seconds>` from `cache-control` added to `now`,
/// then the `expires` header parsed as an HTTP date. Returns None when
/// neither yields a usable instant. Never fails.
pub fn estimate_expiration(
    headers: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if let Some(cache_control) = headers.get("cache-control") {
        if let Some(max_age) = parse_max_age(cache_control) {
            return Some(now + Duration::seconds(max_age));
        }
    }

    headers.get("expires").and_then(|value| parse_http_date(value))
}

/// Extract the first digit run following a `max-age=` token.
fn parse_max_age(cache_control: &str) -> Option<i64> {
    let lowered = cache_control.to_lowercase();
    let start = lowered.find("max-age=")? + "max-age=".len();
    let digits: String = lowered[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parse an `expires` value as RFC 2822 (the HTTP date format), falling back
/// to RFC 3339 for servers that emit it.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
