//! Generic circuit breaker protecting calls to indexers, the downloader, the scanner, and the
//! metadata service (§5 resilience requirements).
//!
//! States: Closed (normal), Open (requests rejected immediately), HalfOpen (single probe
//! request allowed through after the timeout elapses).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout: Duration,
    pub success_threshold: u32,
    pub request_timeout: Duration,
    pub service_name: String,
}

impl CircuitBreakerConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 1,
            request_timeout: Duration::from_secs(10),
            service_name: service_name.into(),
        }
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitBreakerState,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rejected_requests: u64,
    pub consecutive_failures: u32,
    pub service_name: String,
}

#[derive(Debug)]
struct Internal {
    state: CircuitBreakerState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    circuit_opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Arc<RwLock<Internal>>,
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(Internal {
                state: CircuitBreakerState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                circuit_opened_at: None,
            })),
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    /// Run `operation` through the breaker, enforcing the request timeout and updating state.
    pub async fn call<F, T>(&self, operation: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        if !self.can_proceed().await {
            self.rejected_requests.fetch_add(1, Ordering::Relaxed);
            return Err(PipelineError::CircuitOpen {
                service: self.config.service_name.clone(),
            });
        }

        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        match tokio::time::timeout(self.config.request_timeout, operation).await {
            Ok(Ok(value)) => {
                self.on_success().await;
                debug!(
                    service = %self.config.service_name,
                    duration_ms = started.elapsed().as_millis(),
                    "circuit breaker call succeeded"
                );
                Ok(value)
            }
            Ok(Err(err)) => {
                self.on_failure().await;
                error!(
                    service = %self.config.service_name,
                    error = %err,
                    "circuit breaker call failed"
                );
                Err(err)
            }
            Err(_) => {
                self.on_failure().await;
                let err = PipelineError::Timeout {
                    operation: format!("{} request", self.config.service_name),
                };
                error!(service = %self.config.service_name, "circuit breaker call timed out");
                Err(err)
            }
        }
    }

    async fn can_proceed(&self) -> bool {
        let mut state = self.state.write().await;
        match state.state {
            CircuitBreakerState::Closed => true,
            CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => {
                let elapsed = state
                    .circuit_opened_at
                    .map(|t| t.elapsed() >= self.config.timeout)
                    .unwrap_or(false);
                if elapsed {
                    debug!(service = %self.config.service_name, "circuit breaker entering half-open");
                    state.state = CircuitBreakerState::HalfOpen;
                    state.consecutive_successes = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    async fn on_success(&self) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write().await;
        state.consecutive_failures = 0;
        match state.state {
            CircuitBreakerState::HalfOpen => {
                state.consecutive_successes += 1;
                if state.consecutive_successes >= self.config.success_threshold {
                    state.state = CircuitBreakerState::Closed;
                    state.circuit_opened_at = None;
                    debug!(service = %self.config.service_name, "circuit breaker closed");
                }
            }
            CircuitBreakerState::Closed | CircuitBreakerState::Open => {}
        }
    }

    async fn on_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write().await;
        state.consecutive_failures += 1;
        match state.state {
            CircuitBreakerState::HalfOpen => {
                warn!(service = %self.config.service_name, "probe failed, reopening circuit");
                state.state = CircuitBreakerState::Open;
                state.circuit_opened_at = Some(Instant::now());
            }
            CircuitBreakerState::Closed if state.consecutive_failures >= self.config.failure_threshold => {
                warn!(
                    service = %self.config.service_name,
                    failures = state.consecutive_failures,
                    "failure threshold reached, opening circuit"
                );
                state.state = CircuitBreakerState::Open;
                state.circuit_opened_at = Some(Instant::now());
            }
            _ => {}
        }
    }

    pub async fn metrics(&self) -> CircuitBreakerMetrics {
        let state = self.state.read().await;
        CircuitBreakerMetrics {
            state: state.state,
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            consecutive_failures: state.consecutive_failures,
            service_name: self.config.service_name.clone(),
        }
    }
}
