//! Liveness/readiness/status endpoints (§6), exempt from API-key enforcement.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /health/live — process is up, regardless of dependency state.
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

/// GET /health/ready — dependencies reachable enough to do useful work.
pub async fn ready(State(state): State<AppState>) -> Json<Value> {
    let downloader_ok = state.downloader.list_active().await.is_ok();
    let status = if downloader_ok { "ready" } else { "not_ready" };
    Json(json!({ "status": status }))
}

/// GET /status
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.status.read().unwrap().clone();
    Json(json!(snapshot))
}
