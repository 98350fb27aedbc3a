//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub sites: SiteCounts,
}

/// Site counts.
#[derive(Debug, Serialize)]
pub struct SiteCounts {
    pub total: usize,
    pub active: usize,
}

/// GET /health - Return engine status.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let all_sites = state.registry.all_sites();
    let active = all_sites.iter().filter(|s| s.active).count();

    let status = if state.monitor.is_running() {
        "running"
    } else {
        "paused"
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sites: SiteCounts {
            total: all_sites.len(),
            active,
        },
    })
}
