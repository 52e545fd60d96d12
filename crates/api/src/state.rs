//! Shared state injected into every handler: the wired collaborators plus the one piece of
//! process-scoped global state this facade keeps — the last tick's summary (§6, §9).

use std::sync::{Arc, RwLock};

use acquisitiond_downloaders::DownloaderClient;
use acquisitiond_orchestrator::{Orchestrator, Scheduler, TickSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_result: Option<TickSummary>,
    pub state: &'static str,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self { last_run_at: None, last_result: None, state: "idle" }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub scheduler: Arc<Scheduler>,
    pub downloader: Arc<DownloaderClient>,
    pub api_key: String,
    pub status: Arc<RwLock<StatusSnapshot>>,
}

impl AppState {
    pub fn record_tick(&self, result: &Result<TickSummary, acquisitiond_core::PipelineError>) {
        let mut snapshot = self.status.write().unwrap();
        snapshot.last_run_at = Some(Utc::now());
        snapshot.state = if result.is_ok() { "idle" } else { "errored" };
        snapshot.last_result = result.as_ref().ok().cloned();
    }
}
