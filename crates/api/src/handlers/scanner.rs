//! Manual per-job scan trigger (§6).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub torrent_hash: String,
}

/// POST /scanner/scan
pub async fn scan(
    State(state): State<AppState>,
    Json(body): Json<ScanRequest>,
) -> ApiResult<Json<acquisitiond_orchestrator::ScanOutcome>> {
    let outcome = state.orchestrator.run_scan(&body.torrent_hash).await?;
    Ok(Json(outcome))
}
