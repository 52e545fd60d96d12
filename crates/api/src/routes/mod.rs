//! Router assembly: health routes are exempt from API-key enforcement (§6); everything else
//! sits behind the `require_api_key` layer.

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{downloader, health, orchestrator, scanner};
use crate::middleware::{request_logger, require_api_key};
use crate::state::AppState;

pub fn create_health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
}

fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orchestrator/run", post(orchestrator::run))
        .route("/orchestrator/reconcile", post(orchestrator::reconcile))
        .route("/scanner/scan", post(scanner::scan))
        .route("/downloader/torrents", get(downloader::torrents))
        .route("/status", get(health::status))
        .layer(axum_middleware::from_fn_with_state(state, require_api_key))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(create_health_routes())
        .merge(create_protected_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logger))
        .with_state(state)
}
