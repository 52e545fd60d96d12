//! Request logging and API-key enforcement middleware, adapted from this workspace's
//! `require_api_key`/`request_logger` pair.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;

pub async fn request_logger(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    tracing::info!("{} {} -> {}", method, uri, response.status());
    response
}

/// Rejects mutating requests whose `X-API-Key` header doesn't match the configured secret.
/// `/health*` is registered on a router that never applies this layer (§6).
pub async fn require_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = headers.get("X-Api-Key").and_then(|v| v.to_str().ok());
    match provided {
        Some(key) if key == state.api_key => Ok(next.run(request).await),
        _ => {
            tracing::warn!(path = %request.uri().path(), "rejected request with invalid or missing API key");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
