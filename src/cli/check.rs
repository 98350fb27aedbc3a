//! One-shot check command implementation

use crate::analyzer::{classify, relevant_headers};
use crate::cli::output::{format_check_json, format_check_table, CheckView};
use crate::cli::CheckArgs;
use crate::fetch::{HeaderFetcher, HttpHeaderFetcher};
use crate::registry::is_valid_url;
use anyhow::{bail, Context};
use std::time::Duration;

/// Fetch one URL, classify it, and render the result.
pub async fn run_check(args: CheckArgs) -> anyhow::Result<String> {
    if !is_valid_url(&args.url) {
        bail!("invalid URL: {}", args.url);
    }

    let fetcher = HttpHeaderFetcher::new();
    let fetched = fetcher
        .fetch(&args.url, Duration::from_secs(args.timeout_seconds))
        .await
        .with_context(|| format!("failed to fetch headers for {}", args.url))?;

    let headers = relevant_headers(&fetched.headers);
    let analysis = classify(&headers);
    let view = CheckView::new(args.url, analysis, fetched.response_time_ms, headers);

    Ok(if args.json {
        format_check_json(&view)
    } else {
        format_check_table(&view)
    })
}
