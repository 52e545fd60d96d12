//! HTTP-facing error mapping (§6). Every handler returns `ApiResult<T>`; `PipelineError` is
//! converted into the right status code and a generic body, matching the taxonomy's recovery
//! semantics rather than exposing internal detail.

use acquisitiond_core::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid or missing API key")]
    Unauthorized,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Pipeline(PipelineError::NotFound { resource }) => {
                (StatusCode::NOT_FOUND, format!("not found: {resource}"))
            }
            ApiError::Pipeline(PipelineError::Validation { field, message }) => {
                (StatusCode::BAD_REQUEST, format!("invalid {field}: {message}"))
            }
            ApiError::Pipeline(PipelineError::AuthRejected { service }) => {
                (StatusCode::BAD_GATEWAY, format!("{service} rejected our credentials"))
            }
            ApiError::Pipeline(PipelineError::CircuitOpen { service }) => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("{service} is temporarily unavailable"))
            }
            ApiError::Pipeline(_) => (StatusCode::BAD_GATEWAY, "an upstream collaborator failed".to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid or missing API key".to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
