//! Cache header analysis module.
//!
//! Pure functions that turn a response header map (lowercased names) into a
//! structured cache verdict: which cache layer served the response and
//! whether it was a hit, miss, expired or revalidated entry.

mod expiration;

#[cfg(test)]
mod tests;

pub use expiration::estimate_expiration;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cache layer inferred to have served a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Cloudflare CDN edge cache
    Cloudflare,
    /// WordPress page cache (plugin or host-level)
    Wordpress,
    /// Nginx proxy or FastCGI cache
    Nginx,
    /// Varnish reverse proxy
    Varnish,
    /// No recognized platform markers
    Unknown,
}

/// Classification of a single response's cache behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Served from cache
    Hit,
    /// Fetched from origin
    Miss,
    /// Cached entry was stale and refetched
    Expired,
    /// Cached entry revalidated against origin
    Revalidated,
    /// Headers carry no usable cache signal
    Unknown,
}

/// Result of classifying a header map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheAnalysis {
    pub platform: Platform,
    pub verdict: Verdict,
}

/// Header names worth keeping in check history.
///
/// Everything else is dropped before a result is recorded, so history entries
/// stay small and comparable across platforms.
const RELEVANT_HEADERS: &[&str] = &[
    // Common cache headers
    "cache-control",
    "etag",
    "age",
    "expires",
    "last-modified",
    "date",
    // CDN specific
    "cf-cache-status",
    "cf-ray",
    "x-cache",
    "x-cache-hits",
    "x-fastcgi-cache",
    "x-varnish",
    "x-served-by",
    // Server identification
    "server",
    "x-powered-by",
    "via",
    // Security
    "strict-transport-security",
    "content-security-policy",
    // Content
    "content-type",
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "vary",
];

/// Filter a full header map down to the cache-relevant subset.
///
/// Keys are expected to be lowercased already (the fetcher contract).
pub fn relevant_headers(all: &HashMap<String, String>) -> HashMap<String, String> {
    all.iter()
        .filter(|(name, _)| RELEVANT_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Classify a header map into platform and cache verdict.
///
/// Detection precedence: Cloudflare, WordPress, Nginx, Varnish, then a
/// generic `cache-control`/`age` fallback. First match wins. The function is
/// total; a map with no recognizable signal classifies as unknown/unknown.
pub fn classify(headers: &HashMap<String, String>) -> CacheAnalysis {
    if is_cloudflare(headers) {
        return CacheAnalysis {
            platform: Platform::Cloudflare,
            verdict: cloudflare_verdict(headers),
        };
    }

    if is_wordpress(headers) {
        return CacheAnalysis {
            platform: Platform::Wordpress,
            verdict: x_cache_verdict(headers)
                .unwrap_or_else(|| generic_verdict(headers).unwrap_or(Verdict::Miss)),
        };
    }

    if is_nginx(headers) {
        return CacheAnalysis {
            platform: Platform::Nginx,
            verdict: x_cache_verdict(headers)
                .or_else(|| fastcgi_verdict(headers))
                .unwrap_or(Verdict::Unknown),
        };
    }

    if is_varnish(headers) {
        return CacheAnalysis {
            platform: Platform::Varnish,
            verdict: x_cache_verdict(headers).unwrap_or(Verdict::Unknown),
        };
    }

    CacheAnalysis {
        platform: Platform::Unknown,
        verdict: generic_verdict(headers).unwrap_or(Verdict::Unknown),
    }
}

fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers.get(name).map(String::as_str)
}

fn header_contains(headers: &HashMap<String, String>, name: &str, needle: &str) -> bool {
    header(headers, name)
        .map(|v| v.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn is_cloudflare(headers: &HashMap<String, String>) -> bool {
    headers.contains_key("cf-ray")
        || header(headers, "cf-cache-status").is_some_and(|v| !v.is_empty())
        || header_contains(headers, "server", "cloudflare")
}

fn is_wordpress(headers: &HashMap<String, String>) -> bool {
    header_contains(headers, "x-powered-by", "wordpress")
        || header(headers, "link").is_some_and(|v| v.contains("wp-json"))
}

fn is_nginx(headers: &HashMap<String, String>) -> bool {
    header_contains(headers, "server", "nginx") || header_contains(headers, "x-powered-by", "nginx")
}

fn is_varnish(headers: &HashMap<String, String>) -> bool {
    headers.contains_key("x-varnish") || header_contains(headers, "via", "varnish")
}

/// Verdict straight from `cf-cache-status`.
fn cloudflare_verdict(headers: &HashMap<String, String>) -> Verdict {
    match header(headers, "cf-cache-status")
        .map(|v| v.to_lowercase())
        .as_deref()
    {
        Some("hit") => Verdict::Hit,
        Some("miss") => Verdict::Miss,
        Some("expired") => Verdict::Expired,
        Some("revalidated") => Verdict::Revalidated,
        _ => Verdict::Unknown,
    }
}

/// Substring hit/miss match on `x-cache` (shared by WordPress, Nginx, Varnish).
fn x_cache_verdict(headers: &HashMap<String, String>) -> Option<Verdict> {
    let value = header(headers, "x-cache")?.to_lowercase();
    if value.contains("hit") {
        Some(Verdict::Hit)
    } else if value.contains("miss") {
        Some(Verdict::Miss)
    } else {
        None
    }
}

/// Literal hit/miss match on Nginx's `x-fastcgi-cache`.
fn fastcgi_verdict(headers: &HashMap<String, String>) -> Option<Verdict> {
    match header(headers, "x-fastcgi-cache")
        .map(|v| v.to_lowercase())
        .as_deref()
    {
        Some("hit") => Some(Verdict::Hit),
        Some("miss") => Some(Verdict::Miss),
        _ => None,
    }
}

/// Standard `cache-control` + `age` inference.
///
/// A cacheable response (`max-age` without `no-cache`) that carries an `age`
/// header was served from an intermediary cache; without one it came from
/// origin. Returns None when the response is not cacheable at all.
fn generic_verdict(headers: &HashMap<String, String>) -> Option<Verdict> {
    let cache_control = header(headers, "cache-control")
        .map(|v| v.to_lowercase())
        .unwrap_or_default();

    if cache_control.contains("max-age") && !cache_control.contains("no-cache") {
        if headers.contains_key("age") {
            Some(Verdict::Hit)
        } else {
            Some(Verdict::Miss)
        }
    } else {
        None
    }
}
