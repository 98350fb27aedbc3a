//! API request and response types.

use crate::interval::IntervalMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error envelope returned by failing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Successful header-fetch proxy response.
///
/// Field names are camelCase: this is the contract the dashboard's own
/// fetch path expects from a server-side proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub headers: HashMap<String, String>,
    pub response_time: u64,
}

/// Transport-failure proxy response (still HTTP 200; the proxy itself worked).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFailure {
    pub error: String,
    pub response_time: u64,
}

/// Body for POST /api/sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSiteRequest {
    pub url: String,
    /// Interval mode; the configured default fixed interval applies when omitted
    #[serde(default)]
    pub interval: Option<IntervalMode>,
}

/// Body for PATCH /api/sites/:id. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSiteRequest {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub interval: Option<IntervalMode>,
}

/// Engine run-state response for pause/resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub running: bool,
}
