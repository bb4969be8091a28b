use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub tracked_identifiers: usize,
    pub max_attempts: u32,
    pub window_ms: u64,
    pub session_timeout_minutes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub identifier: String,
    pub remaining: u32,
    pub max_attempts: u32,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let limiter = state.guard.limiter();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        tracked_identifiers: limiter.tracked(),
        max_attempts: limiter.max_attempts(),
        window_ms: limiter.window().as_millis() as u64,
        session_timeout_minutes: state.config.session.timeout_minutes,
    })
}

pub async fn get_rate_limit(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Json<RateLimitStatus> {
    let limiter = state.guard.limiter();
    Json(RateLimitStatus {
        remaining: limiter.remaining_attempts(&identifier),
        max_attempts: limiter.max_attempts(),
        identifier,
    })
}

pub async fn reset_rate_limit(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> StatusCode {
    state.guard.limiter().reset(&identifier);
    tracing::info!(identifier = %identifier, "Rate limit reset by admin");
    StatusCode::NO_CONTENT
}
