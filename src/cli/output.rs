//! Output formatting helpers for CLI commands

use crate::analyzer::{CacheAnalysis, Platform, Verdict};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::collections::HashMap;

/// View model for a one-shot check result
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckView {
    pub url: String,
    pub platform: Platform,
    pub verdict: Verdict,
    pub response_time_ms: u64,
    pub headers: HashMap<String, String>,
}

impl CheckView {
    pub fn new(
        url: String,
        analysis: CacheAnalysis,
        response_time_ms: u64,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            url,
            platform: analysis.platform,
            verdict: analysis.verdict,
            response_time_ms,
            headers,
        }
    }
}

fn verdict_cell(verdict: Verdict) -> String {
    match verdict {
        Verdict::Hit => "Hit".green().to_string(),
        Verdict::Miss => "Miss".yellow().to_string(),
        Verdict::Expired => "Expired".red().to_string(),
        Verdict::Revalidated => "Revalidated".cyan().to_string(),
        Verdict::Unknown => "Unknown".dimmed().to_string(),
    }
}

fn platform_label(platform: Platform) -> &'static str {
    match platform {
        Platform::Cloudflare => "Cloudflare",
        Platform::Wordpress => "WordPress",
        Platform::Nginx => "Nginx",
        Platform::Varnish => "Varnish",
        Platform::Unknown => "Unknown",
    }
}

/// Format a check result as a table
pub fn format_check_table(view: &CheckView) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["URL", "Platform", "Verdict", "Response time"]);
    table.add_row(vec![
        Cell::new(&view.url),
        Cell::new(platform_label(view.platform)),
        Cell::new(verdict_cell(view.verdict)),
        Cell::new(format!("{}ms", view.response_time_ms)),
    ]);

    let mut headers = Table::new();
    headers.load_preset(UTF8_FULL);
    headers.set_content_arrangement(ContentArrangement::Dynamic);
    headers.set_header(vec!["Header", "Value"]);
    let mut names: Vec<_> = view.headers.keys().collect();
    names.sort();
    for name in names {
        headers.add_row(vec![Cell::new(name), Cell::new(&view.headers[name])]);
    }

    format!("{table}\n{headers}")
}

/// Format a check result as JSON
pub fn format_check_json(view: &CheckView) -> String {
    serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string())
}
