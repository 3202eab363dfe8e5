//! Bounded retry with capped exponential backoff.

use std::future::Future;
use std::time::Duration;

use boxpub_core::error::{PublishError, Result};
use tokio_util::sync::CancellationToken;

/// Attempts made by the upload step.
const UPLOAD_TRIES: u32 = 3;
/// First backoff; also the cap, so upload retries wait a constant 10s.
const UPLOAD_BACKOFF: Duration = Duration::from_secs(10);
const UPLOAD_MULTIPLIER: f64 = 2.0;

/// How often and how patiently to retry an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub tries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::upload()
    }
}

impl RetryPolicy {
    /// Policy used for box transfers.
    pub fn upload() -> Self {
        Self {
            tries: UPLOAD_TRIES,
            initial_backoff: UPLOAD_BACKOFF,
            max_backoff: UPLOAD_BACKOFF,
            multiplier: UPLOAD_MULTIPLIER,
        }
    }

    /// Retry `tries` times without waiting in between.
    pub fn immediate(tries: u32) -> Self {
        Self {
            tries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Wait before retry number `retry` (0-indexed).
    pub fn delay(&self, retry: u32) -> Duration {
        let max = self.max_backoff.as_secs_f64();
        let exp = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.max(1.0).powi(exp);
        Duration::from_secs_f64(if secs.is_finite() { secs.min(max) } else { max })
    }

    /// Run `op` until it succeeds, the tries are used up, or `cancel` fires.
    ///
    /// `op` receives the 1-based attempt number. `on_retry` is called after
    /// each failed attempt that will be retried, with the attempt number,
    /// the error and the upcoming delay. On exhaustion the last error is
    /// returned. Cancellation errors are never retried.
    pub async fn run<T, F, Fut, R>(
        &self,
        cancel: &CancellationToken,
        mut on_retry: R,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
        R: FnMut(u32, &PublishError, Duration),
    {
        let tries = self.tries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                result = op(attempt) => result,
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err @ PublishError::Cancelled(_)) => return Err(err),
                Err(err) if attempt >= tries => return Err(err),
                Err(err) => err,
            };

            let delay = self.delay(attempt - 1);
            tracing::debug!(attempt, tries, delay_ms = delay.as_millis() as u64, error = %err, "Retrying");
            on_retry(attempt, &err, delay);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn cancelled() -> PublishError {
    PublishError::Cancelled("retry loop interrupted".to_string())
}
