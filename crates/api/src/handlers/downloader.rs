//! Operator-visibility passthrough (§6).

use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /downloader/torrents
pub async fn torrents(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<acquisitiond_downloaders::TorrentStatus>>> {
    let list = state.downloader.list_active().await?;
    Ok(Json(list))
}
