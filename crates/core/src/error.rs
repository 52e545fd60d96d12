//! Domain error taxonomy shared by every collaborator client, repository, and the orchestrator.

use thiserror::Error;

/// The kinds of failure the orchestrator and reconciler know how to react to.
///
/// Variants are grouped by recovery policy, not by source: a `Transport` failure from the
/// catalog and a `Transport` failure from the downloader are handled identically by callers.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network failure, timeout, or 5xx from an upstream collaborator. Safe to retry.
    #[error("transport error calling {service}: {message}")]
    Transport { service: String, message: String },

    /// Upstream rejected the credentials presented. Never retried automatically.
    #[error("{service} rejected credentials for this request")]
    AuthRejected { service: String },

    /// Expected during races: the referenced resource no longer exists upstream.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// A unique-index violation on a field the orchestrator treats as "already tracked".
    #[error("duplicate key on {field}: {value}")]
    DuplicateKey { field: String, value: String },

    /// Upstream returned a payload that a tolerant parser still could not validate.
    #[error("malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    /// The scanner is unavailable or returned something that isn't a verdict.
    #[error("scan error: {message}")]
    ScanError { message: String },

    /// A filesystem move/delete/scan operation failed.
    #[error("filesystem error at {path}: {message}")]
    FilesystemError { path: String, message: String },

    /// Input failed a validation rule before any I/O was attempted.
    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// Required configuration was missing or malformed at boot. The only fatal kind.
    #[error("configuration error for {field}: {message}")]
    Configuration { field: String, message: String },

    /// A collaborator's circuit breaker is open; the call was rejected before it started.
    #[error("circuit breaker open for {service}")]
    CircuitOpen { service: String },

    /// A collaborator call exceeded its configured timeout.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// All configured retry attempts were exhausted.
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<PipelineError>,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// True for the error kinds the retry policy is allowed to retry automatically (§7).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Transport { .. } | PipelineError::Timeout { .. } | PipelineError::CircuitOpen { .. }
        )
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => PipelineError::NotFound {
                resource: "row".to_string(),
            },
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                PipelineError::DuplicateKey {
                    field: db_err.constraint().unwrap_or("unknown").to_string(),
                    value: "unknown".to_string(),
                }
            }
            _ => PipelineError::Transport {
                service: "database".to_string(),
                message: err.to_string(),
            },
        }
    }
}
