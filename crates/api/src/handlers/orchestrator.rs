//! Manual orchestrator/reconciler triggers (§6).

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// POST /orchestrator/run
pub async fn run(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    match state.scheduler.run_now().await {
        Some(summary) => {
            state.record_tick(&Ok(summary.clone()));
            Ok(Json(json!(summary)))
        }
        None => Ok(Json(json!({ "skipped": true, "reason": "a tick is already in flight" }))),
    }
}

/// POST /orchestrator/reconcile
pub async fn reconcile(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let summary = acquisitiond_orchestrator::reconcile(
        state.orchestrator.download_jobs.as_ref(),
        state.orchestrator.downloader.as_ref(),
    )
    .await?;
    Ok(Json(json!(summary)))
}
