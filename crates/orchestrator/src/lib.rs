//! Ties every collaborator client and repository together into the per-tick pipeline
//! controller, its reconciler, and its scheduler (§4.10-§4.12).

mod orchestrator;
mod reconciler;
mod scheduler;

pub use orchestrator::{MatchingConfig, Orchestrator, ScanOutcome, TickSummary};
pub use reconciler::{reconcile, ReconcileSummary};
pub use scheduler::{Scheduler, SchedulerConfig};

#[cfg(test)]
mod mocks;
