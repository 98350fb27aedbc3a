//! Site configuration surface.
//!
//! CRUD plus the engine-wide operations the dashboard calls: refresh all,
//! pause, resume.

use crate::api::types::{AddSiteRequest, ApiError, RunState, UpdateSiteRequest};
use crate::api::AppState;
use crate::interval::IntervalMode;
use crate::registry::is_valid_url;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

/// GET /api/sites — every registered site.
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    Json(state.registry.all_sites()).into_response()
}

/// POST /api/sites — register a site and start checking it.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddSiteRequest>,
) -> Response {
    if !is_valid_url(&request.url) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(format!("Invalid URL: {}", request.url))),
        )
            .into_response();
    }

    let interval = request
        .interval
        .unwrap_or(IntervalMode::Fixed(state.config.monitor.default_interval_ms));
    let site = state.monitor.add_site(request.url, interval);
    (StatusCode::CREATED, Json(site)).into_response()
}

/// DELETE /api/sites/:id — remove a site and cancel its pending check.
pub async fn remove(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.monitor.remove_site(&id) {
        Ok(site) => Json(site).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(ApiError::new(e.to_string()))).into_response(),
    }
}

/// PATCH /api/sites/:id — change activity and/or interval mode.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSiteRequest>,
) -> Response {
    if let Some(interval) = request.interval {
        if let Err(e) = state.monitor.set_interval(&id, interval) {
            return (StatusCode::NOT_FOUND, Json(ApiError::new(e.to_string()))).into_response();
        }
    }
    if let Some(active) = request.active {
        if let Err(e) = state.monitor.set_active(&id, active) {
            return (StatusCode::NOT_FOUND, Json(ApiError::new(e.to_string()))).into_response();
        }
    }

    match state.registry.get_site(&id) {
        Some(site) => Json(site).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!("site not found: {id}"))),
        )
            .into_response(),
    }
}

/// GET /api/sites/:id/stats — statistics for one site.
pub async fn site_stats(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.stats.get(&id) {
        Some(stats) => Json(stats).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!("site not found: {id}"))),
        )
            .into_response(),
    }
}

/// GET /api/stats — statistics for every site, keyed by id.
pub async fn all_stats(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stats.snapshot()).into_response()
}

/// POST /api/refresh — check every active site now.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    state.monitor.refresh_all();
    (StatusCode::ACCEPTED, Json(RunState { running: state.monitor.is_running() })).into_response()
}

/// POST /api/pause — cancel all pending checks, keep data.
pub async fn pause(State(state): State<Arc<AppState>>) -> Response {
    state.monitor.pause();
    Json(RunState { running: false }).into_response()
}

/// POST /api/resume — re-arm every active site.
pub async fn resume(State(state): State<Arc<AppState>>) -> Response {
    state.monitor.resume();
    Json(RunState { running: true }).into_response()
}
