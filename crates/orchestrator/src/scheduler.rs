//! Fixed-interval timer driving the Orchestrator (§4.12). Ticks start on process start; an
//! overlapping trigger is dropped, not queued, so a slow upstream bounds load instead of
//! building a backlog of pending ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, warn};

use crate::orchestrator::{Orchestrator, TickSummary};

/// Configuration for the tick timer (§6's `tick_interval` option).
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_interval: Duration::from_secs(600) }
    }
}

/// Owns the background tick loop. Dropping the handle without calling [`Scheduler::shutdown`]
/// leaves the loop running detached; prefer `shutdown` for a clean stop.
pub struct Scheduler {
    config: SchedulerConfig,
    orchestrator: Arc<Orchestrator>,
    tick_in_flight: Arc<AtomicBool>,
    current_tick: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            config,
            orchestrator,
            tick_in_flight: Arc::new(AtomicBool::new(false)),
            current_tick: Arc::new(Mutex::new(None)),
            shutdown_tx: None,
            task: None,
        }
    }

    /// Starts the timer. Idempotent only in the sense that calling it twice spawns two loops;
    /// callers are expected to call this once at process start.
    pub fn start(&mut self) {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let orchestrator = self.orchestrator.clone();
        let tick_in_flight = self.tick_in_flight.clone();
        let current_tick = self.current_tick.clone();
        let tick_interval = self.config.tick_interval;

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if tick_in_flight.swap(true, Ordering::SeqCst) {
                            warn!("previous tick still running, dropping this trigger");
                            continue;
                        }
                        let orchestrator = orchestrator.clone();
                        let tick_in_flight = tick_in_flight.clone();
                        let handle = tokio::spawn(async move {
                            match orchestrator.run_tick().await {
                                Ok(summary) => debug!(?summary, "tick complete"),
                                Err(err) => error!(error = %err, "tick failed"),
                            }
                            tick_in_flight.store(false, Ordering::SeqCst);
                        });
                        *current_tick.lock().await = Some(handle);
                    }
                    _ = &mut shutdown_rx => {
                        debug!("scheduler shutting down, awaiting any in-flight tick");
                        break;
                    }
                }
            }
        }));
    }

    /// Cancels the timer and awaits the most recently spawned tick to completion. Per §4.12/
    /// §10.7 this does not forcibly abort an in-flight tick; it genuinely joins it so nothing is
    /// left running mid-file-move at process exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        if let Some(handle) = self.current_tick.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// Runs one tick immediately, outside the timer, honoring the same drop-on-overlap
    /// contract as the timer (used by `/orchestrator/run`).
    pub async fn run_now(&self) -> Option<TickSummary> {
        if self.tick_in_flight.swap(true, Ordering::SeqCst) {
            warn!("a tick is already running, refusing to start a manual one concurrently");
            return None;
        }
        let result = self.orchestrator.run_tick().await;
        self.tick_in_flight.store(false, Ordering::SeqCst);
        match result {
            Ok(summary) => Some(summary),
            Err(err) => {
                error!(error = %err, "manual tick failed");
                None
            }
        }
    }
}
