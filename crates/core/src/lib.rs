//! Shared domain types, scoring, resilience primitives, and repository contracts for the
//! acquisition pipeline. Every other crate in the workspace depends on this one; this crate
//! depends on nothing workspace-internal.

pub mod candidate;
pub mod circuit_breaker;
pub mod error;
pub mod mask;
pub mod models;
pub mod quality;
pub mod repositories;
pub mod retry;
pub mod selector;
pub mod similarity;

pub use candidate::{IndexerResult, ScoredCandidate};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerState};
pub use error::{PipelineError, Result};
pub use mask::mask_secret;
pub use models::{DownloadJob, MediaKind, ScanRecord, WatchUser, WatchlistEntry};
pub use quality::{score_release, QualityFacets};
pub use repositories::{DownloadJobRepository, ScanRecordRepository, WatchUserRepository};
pub use retry::{retry_with_backoff, RetryConfig};
pub use selector::select_candidates;
pub use similarity::{matches as similar, similarity, DEFAULT_APPEARANCE_WINDOW_SECS, DEFAULT_SIMILARITY_THRESHOLD};
