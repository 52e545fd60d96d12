//! Exponential backoff with jitter, restricted to retryable error kinds (§5, §7).

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Short-lived collaborator calls: indexer search, downloader status polls.
    pub fn quick() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Slower operations: scans, filesystem moves.
    pub fn slow() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(120),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Run `operation` up to `config.max_attempts` times, retrying only errors for which
/// [`PipelineError::is_retryable`] returns true. Non-retryable errors return immediately.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "retry succeeded");
                }
                return Ok(value);
            }
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                if attempt >= config.max_attempts {
                    warn!(
                        operation = operation_name,
                        attempts = config.max_attempts,
                        error = %err,
                        "retries exhausted"
                    );
                    return Err(PipelineError::RetryExhausted {
                        operation: operation_name.to_string(),
                        attempts: config.max_attempts,
                        source: Box::new(err),
                    });
                }
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %err,
                    delay_ms = delay.as_millis(),
                    "retrying after failure"
                );
                sleep(delay).await;
                delay = next_delay(delay, &config);
            }
        }
    }
}

fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let mut next = current.mul_f64(config.backoff_multiplier);
    if next > config.max_delay {
        next = config.max_delay;
    }
    if config.jitter {
        let factor = rand::thread_rng().gen_range(0.5..1.5);
        next = next.mul_f64(factor);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&RetryConfig::quick(), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, PipelineError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transport_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&RetryConfig::quick(), "op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PipelineError::Transport {
                        service: "indexer".into(),
                        message: "503".into(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(&RetryConfig::quick(), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(PipelineError::AuthRejected { service: "downloader".into() }) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wraps_exhausted_retries_in_retry_exhausted() {
        let result: Result<()> = retry_with_backoff(&RetryConfig::quick(), "op", || async {
            Err(PipelineError::Timeout { operation: "scan".into() })
        })
        .await;
        assert!(matches!(result, Err(PipelineError::RetryExhausted { attempts: 3, .. })));
    }
}
