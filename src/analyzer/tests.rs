//! Unit tests for the analyzer module.

use super::*;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Cloudflare detection
// ============================================================================

#[test]
fn test_cloudflare_detected_by_cf_ray() {
    let analysis = classify(&headers(&[("cf-ray", "8a1b2c3d4e5f-IAD")]));
    assert_eq!(analysis.platform, Platform::Cloudflare);
    assert_eq!(analysis.verdict, Verdict::Unknown);
}

#[test]
fn test_cloudflare_detected_by_server_header() {
    let analysis = classify(&headers(&[("server", "Cloudflare")]));
    assert_eq!(analysis.platform, Platform::Cloudflare);
}

#[test]
fn test_cloudflare_empty_cache_status_does_not_detect() {
    // An empty cf-cache-status alone is not a Cloudflare marker
    let analysis = classify(&headers(&[("cf-cache-status", "")]));
    assert_eq!(analysis.platform, Platform::Unknown);
}

#[test]
fn test_cloudflare_verdicts_any_case() {
    for (raw, expected) in [
        ("HIT", Verdict::Hit),
        ("hit", Verdict::Hit),
        ("MISS", Verdict::Miss),
        ("Miss", Verdict::Miss),
        ("EXPIRED", Verdict::Expired),
        ("REVALIDATED", Verdict::Revalidated),
        ("DYNAMIC", Verdict::Unknown),
        ("BYPASS", Verdict::Unknown),
    ] {
        let analysis = classify(&headers(&[("cf-cache-status", raw)]));
        assert_eq!(analysis.platform, Platform::Cloudflare, "status {raw}");
        assert_eq!(analysis.verdict, expected, "status {raw}");
    }
}

#[test]
fn test_cloudflare_takes_precedence_over_nginx() {
    // cf-ray wins even when the server header says nginx
    let analysis = classify(&headers(&[
        ("cf-ray", "abc-IAD"),
        ("server", "nginx/1.20.1"),
        ("cf-cache-status", "HIT"),
    ]));
    assert_eq!(analysis.platform, Platform::Cloudflare);
    assert_eq!(analysis.verdict, Verdict::Hit);
}

// ============================================================================
// WordPress detection
// ============================================================================

#[test]
fn test_wordpress_detected_by_x_powered_by() {
    let analysis = classify(&headers(&[("x-powered-by", "WordPress/6.2")]));
    assert_eq!(analysis.platform, Platform::Wordpress);
}

#[test]
fn test_wordpress_detected_by_wp_json_link() {
    let analysis = classify(&headers(&[(
        "link",
        "<https://example.com/wp-json/>; rel=\"https://api.w.org/\"",
    )]));
    assert_eq!(analysis.platform, Platform::Wordpress);
}

#[test]
fn test_wordpress_x_cache_hit() {
    let analysis = classify(&headers(&[
        ("x-powered-by", "WordPress"),
        ("x-cache", "HIT from wp-super-cache"),
    ]));
    assert_eq!(analysis.verdict, Verdict::Hit);
}

#[test]
fn test_wordpress_cache_control_with_age_is_hit() {
    let analysis = classify(&headers(&[
        ("x-powered-by", "WordPress"),
        ("cache-control", "public, max-age=3600"),
        ("age", "120"),
    ]));
    assert_eq!(analysis.verdict, Verdict::Hit);
}

#[test]
fn test_wordpress_cache_control_without_age_is_miss() {
    let analysis = classify(&headers(&[
        ("x-powered-by", "WordPress"),
        ("cache-control", "public, max-age=3600"),
    ]));
    assert_eq!(analysis.verdict, Verdict::Miss);
}

#[test]
fn test_wordpress_no_cache_signal_defaults_to_miss() {
    let analysis = classify(&headers(&[("x-powered-by", "WordPress")]));
    assert_eq!(analysis.verdict, Verdict::Miss);
}

// ============================================================================
// Nginx detection
// ============================================================================

#[test]
fn test_nginx_detected_by_server() {
    let analysis = classify(&headers(&[("server", "nginx/1.20.1")]));
    assert_eq!(analysis.platform, Platform::Nginx);
    assert_eq!(analysis.verdict, Verdict::Unknown);
}

#[test]
fn test_nginx_fastcgi_cache_verdicts() {
    for (raw, expected) in [
        ("HIT", Verdict::Hit),
        ("MISS", Verdict::Miss),
        ("EXPIRED", Verdict::Unknown), // only literal hit/miss map
    ] {
        let analysis = classify(&headers(&[
            ("server", "nginx"),
            ("x-fastcgi-cache", raw),
        ]));
        assert_eq!(analysis.verdict, expected, "fastcgi {raw}");
    }
}

#[test]
fn test_nginx_x_cache_beats_fastcgi() {
    let analysis = classify(&headers(&[
        ("server", "nginx"),
        ("x-cache", "MISS"),
        ("x-fastcgi-cache", "HIT"),
    ]));
    assert_eq!(analysis.verdict, Verdict::Miss);
}

// ============================================================================
// Varnish detection
// ============================================================================

#[test]
fn test_varnish_detected_by_x_varnish() {
    let analysis = classify(&headers(&[("x-varnish", "123456 987654")]));
    assert_eq!(analysis.platform, Platform::Varnish);
    assert_eq!(analysis.verdict, Verdict::Unknown);
}

#[test]
fn test_varnish_detected_by_via() {
    let analysis = classify(&headers(&[
        ("via", "1.1 varnish (Varnish/6.0)"),
        ("x-cache", "HIT"),
    ]));
    assert_eq!(analysis.platform, Platform::Varnish);
    assert_eq!(analysis.verdict, Verdict::Hit);
}

// ============================================================================
// Generic fallback
// ============================================================================

#[test]
fn test_generic_max_age_without_age_is_miss() {
    let analysis = classify(&headers(&[("cache-control", "max-age=60")]));
    assert_eq!(analysis.platform, Platform::Unknown);
    assert_eq!(analysis.verdict, Verdict::Miss);
}

#[test]
fn test_generic_max_age_with_age_is_hit() {
    let analysis = classify(&headers(&[
        ("cache-control", "max-age=60"),
        ("age", "12"),
    ]));
    assert_eq!(analysis.verdict, Verdict::Hit);
}

#[test]
fn test_generic_no_cache_is_unknown() {
    let analysis = classify(&headers(&[(
        "cache-control",
        "no-cache, max-age=0",
    )]));
    assert_eq!(analysis.verdict, Verdict::Unknown);
}

#[test]
fn test_empty_headers_classify_as_unknown() {
    let analysis = classify(&HashMap::new());
    assert_eq!(analysis.platform, Platform::Unknown);
    assert_eq!(analysis.verdict, Verdict::Unknown);
}

// ============================================================================
// Relevant header filtering
// ============================================================================

#[test]
fn test_relevant_headers_keeps_cache_subset() {
    let all = headers(&[
        ("cache-control", "max-age=60"),
        ("set-cookie", "session=abc"),
        ("cf-cache-status", "HIT"),
        ("x-request-id", "deadbeef"),
    ]);
    let kept = relevant_headers(&all);
    assert_eq!(kept.len(), 2);
    assert!(kept.contains_key("cache-control"));
    assert!(kept.contains_key("cf-cache-status"));
    assert!(!kept.contains_key("set-cookie"));
}

// ============================================================================
// Expiration estimation
// ============================================================================

#[test]
fn test_expiration_from_max_age() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let exp = estimate_expiration(&headers(&[("cache-control", "public, max-age=3600")]), now);
    assert_eq!(exp, Some(now + chrono::Duration::seconds(3600)));
}

#[test]
fn test_expiration_max_age_beats_expires() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let exp = estimate_expiration(
        &headers(&[
            ("cache-control", "max-age=60"),
            ("expires", "Sat, 01 Jun 2024 18:00:00 GMT"),
        ]),
        now,
    );
    assert_eq!(exp, Some(now + chrono::Duration::seconds(60)));
}

#[test]
fn test_expiration_from_expires_header() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let exp = estimate_expiration(
        &headers(&[("expires", "Sat, 01 Jun 2024 18:00:00 GMT")]),
        now,
    );
    assert_eq!(exp, Some(Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()));
}

#[test]
fn test_expiration_unparseable_expires_is_none() {
    let now = Utc::now();
    assert_eq!(
        estimate_expiration(&headers(&[("expires", "0")]), now),
        None
    );
    assert_eq!(
        estimate_expiration(&headers(&[("expires", "not a date")]), now),
        None
    );
}

#[test]
fn test_expiration_malformed_max_age_falls_through() {
    let now = Utc::now();
    assert_eq!(
        estimate_expiration(&headers(&[("cache-control", "max-age=abc")]), now),
        None
    );
}

#[test]
fn test_expiration_empty_headers_is_none() {
    assert_eq!(estimate_expiration(&HashMap::new(), Utc::now()), None);
}

// ============================================================================
// Total-function property
// ============================================================================

proptest! {
    #[test]
    fn classify_is_total_over_arbitrary_header_maps(
        pairs in proptest::collection::hash_map("[a-z-]{1,20}", ".{0,40}", 0..12)
    ) {
        let analysis = classify(&pairs);
        // Verdict is always populated, never an out-of-range value
        prop_assert!(matches!(
            analysis.verdict,
            Verdict::Hit | Verdict::Miss | Verdict::Expired | Verdict::Revalidated | Verdict::Unknown
        ));
    }

    #[test]
    fn estimate_expiration_never_panics(
        cache_control in ".{0,60}",
        expires in ".{0,60}",
    ) {
        let mut map = HashMap::new();
        map.insert("cache-control".to_string(), cache_control);
        map.insert("expires".to_string(), expires);
        let _ = estimate_expiration(&map, Utc::now());
    }
}
