//! Header-fetch proxy endpoint.
//!
//! A stateless single-shot "fetch headers for this URL" operation, used by
//! browser dashboards that cannot issue cross-origin HEAD requests
//! themselves.

use crate::api::types::{ApiError, CheckFailure, CheckResponse};
use crate::api::AppState;
use crate::registry::is_valid_url;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    pub url: Option<String>,
}

/// GET /api/check?url=… — fetch headers for one URL.
///
/// Transport failures are reported in the body with HTTP 200 (the proxy
/// itself succeeded); only a missing or invalid `url` parameter is a 400.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckParams>,
) -> Response {
    let Some(url) = params.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("URL parameter is required")),
        )
            .into_response();
    };

    if !is_valid_url(&url) {
        return (StatusCode::BAD_REQUEST, Json(ApiError::new("Invalid URL"))).into_response();
    }

    let timeout = Duration::from_secs(state.config.monitor.timeout_seconds);
    let start = Instant::now();

    match state.fetcher.fetch(&url, timeout).await {
        Ok(fetched) => Json(CheckResponse {
            headers: fetched.headers,
            response_time: fetched.response_time_ms,
        })
        .into_response(),
        Err(e) => Json(CheckFailure {
            error: e.to_string(),
            response_time: start.elapsed().as_millis() as u64,
        })
        .into_response(),
    }
}
