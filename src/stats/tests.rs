//! Unit tests for the stats module.

use super::*;
use chrono::Utc;

fn result(verdict: Verdict, response_time_ms: u64) -> CacheCheckResult {
    CacheCheckResult {
        site_id: "site-1".to_string(),
        timestamp: Utc::now(),
        headers: HashMap::new(),
        platform: Platform::Cloudflare,
        verdict,
        response_time_ms,
        is_error: false,
        error_message: None,
    }
}

#[test]
fn test_empty_stats_are_all_zero() {
    let stats = SiteStats::new("site-1".to_string());
    assert_eq!(stats.hit_rate, 0.0);
    assert_eq!(stats.miss_rate, 0.0);
    assert_eq!(stats.avg_response_time_ms, 0.0);
    assert!(stats.last_result().is_none());
}

#[test]
fn test_record_updates_rates() {
    let mut stats = SiteStats::new("site-1".to_string());
    stats.record(result(Verdict::Hit, 100));
    stats.record(result(Verdict::Hit, 200));
    stats.record(result(Verdict::Miss, 300));
    stats.record(result(Verdict::Unknown, 400));

    assert_eq!(stats.history.len(), 4);
    assert_eq!(stats.hit_rate, 50.0);
    assert_eq!(stats.miss_rate, 50.0);
    assert_eq!(stats.avg_response_time_ms, 250.0);
}

#[test]
fn test_rates_always_complement() {
    let mut stats = SiteStats::new("site-1".to_string());
    stats.record(result(Verdict::Hit, 10));
    stats.record(result(Verdict::Miss, 10));
    stats.record(result(Verdict::Expired, 10));
    assert_eq!(stats.hit_rate + stats.miss_rate, 100.0);
}

#[test]
fn test_most_recent_first_ordering() {
    let mut stats = SiteStats::new("site-1".to_string());
    stats.record(result(Verdict::Miss, 10));
    stats.record(result(Verdict::Hit, 20));

    let last = stats.last_result().unwrap();
    assert_eq!(last.verdict, Verdict::Hit);
    assert_eq!(last.response_time_ms, 20);
}

#[test]
fn test_history_caps_at_100_and_rates_follow_window() {
    // 50 hits first, then 100 misses: the cap keeps only the misses
    let mut stats = SiteStats::new("site-1".to_string());
    for _ in 0..50 {
        stats.record(result(Verdict::Hit, 10));
    }
    for _ in 0..100 {
        stats.record(result(Verdict::Miss, 10));
    }

    assert_eq!(stats.history.len(), MAX_HISTORY);
    assert!(stats.hit_rate < 50.0);
    assert_eq!(stats.hit_rate, 0.0);
    assert_eq!(stats.miss_rate, 100.0);
    assert!(stats
        .history
        .iter()
        .all(|r| r.verdict == Verdict::Miss));
}

#[test]
fn test_avg_response_time_ignores_zero_samples() {
    let mut stats = SiteStats::new("site-1".to_string());
    stats.record(result(Verdict::Hit, 100));
    stats.record(CacheCheckResult::transport_error(
        "site-1".to_string(),
        Utc::now(),
        "connection refused".to_string(),
    ));
    stats.record(result(Verdict::Miss, 300));

    // The error entry contributes to rates but not to the timing mean
    assert_eq!(stats.avg_response_time_ms, 200.0);
    assert!((stats.hit_rate - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_avg_response_time_zero_when_no_timed_samples() {
    let mut stats = SiteStats::new("site-1".to_string());
    stats.record(CacheCheckResult::transport_error(
        "site-1".to_string(),
        Utc::now(),
        "timeout".to_string(),
    ));
    assert_eq!(stats.avg_response_time_ms, 0.0);
}

#[test]
fn test_transport_error_shape() {
    let err = CacheCheckResult::transport_error(
        "site-1".to_string(),
        Utc::now(),
        "request timeout after 10s".to_string(),
    );
    assert!(err.is_error);
    assert_eq!(err.verdict, Verdict::Unknown);
    assert_eq!(err.platform, Platform::Unknown);
    assert_eq!(
        err.error_message.as_deref(),
        Some("request timeout after 10s")
    );
    assert!(err.headers.is_empty());
}

// ============================================================================
// StatsStore
// ============================================================================

#[test]
fn test_store_init_and_record() {
    let store = StatsStore::new();
    store.init_site("site-1");
    assert!(store.record("site-1", result(Verdict::Hit, 50)));

    let stats = store.get("site-1").unwrap();
    assert_eq!(stats.history.len(), 1);
    assert_eq!(stats.hit_rate, 100.0);
}

#[test]
fn test_store_init_is_idempotent() {
    let store = StatsStore::new();
    store.init_site("site-1");
    store.record("site-1", result(Verdict::Hit, 50));
    store.init_site("site-1");

    // Re-initializing must not wipe recorded history
    assert_eq!(store.get("site-1").unwrap().history.len(), 1);
}

#[test]
fn test_store_record_unknown_site_is_dropped() {
    let store = StatsStore::new();
    assert!(!store.record("ghost", result(Verdict::Hit, 50)));
    assert!(store.get("ghost").is_none());
    assert!(store.is_empty());
}

#[test]
fn test_store_remove_then_record_does_not_resurrect() {
    let store = StatsStore::new();
    store.init_site("site-1");
    store.record("site-1", result(Verdict::Hit, 50));
    store.remove_site("site-1");

    assert!(!store.record("site-1", result(Verdict::Miss, 60)));
    assert!(store.get("site-1").is_none());
}

#[test]
fn test_store_snapshot() {
    let store = StatsStore::new();
    store.init_site("a");
    store.init_site("b");
    store.record("a", result(Verdict::Hit, 10));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["a"].history.len(), 1);
    assert_eq!(snapshot["b"].history.len(), 0);
}

#[test]
fn test_stats_serde_roundtrip() {
    let mut stats = SiteStats::new("site-1".to_string());
    stats.record(result(Verdict::Hit, 123));

    let json = serde_json::to_string(&stats).unwrap();
    let parsed: SiteStats = serde_json::from_str(&json).unwrap();
    assert_eq!(stats, parsed);
}
