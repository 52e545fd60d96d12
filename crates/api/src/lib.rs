//! Internal HTTP facade (§6): manual triggers for the orchestrator, reconciler, and scanner,
//! plus health/status probes. A thin shell — all real logic lives in `acquisitiond-orchestrator`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, StatusSnapshot};

#[cfg(test)]
mod tests;
