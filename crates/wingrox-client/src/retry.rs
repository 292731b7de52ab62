//! Retry layer on top of the fallback client.
//!
//! A retry re-runs the whole candidate walk. Only `AllEndpointsFailed`
//! qualifies; everything else (validation, not found, ambiguous writes) is
//! returned on the first run.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use wingrox_types::Idempotency;

use crate::fallback::FallbackError;
use crate::types::RetryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
    pub retry_writes: bool,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
            retry_writes: false,
        }
    }

    /// Backoff before retry number `retry` (1-based), before jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn delay(&self, retry: u32) -> Duration {
        let backoff = self.backoff(retry);
        if !self.jitter || backoff.is_zero() {
            return backoff;
        }
        // Equal jitter: half fixed, half random.
        let half = backoff / 2;
        let spread = u64::try_from(half.as_millis()).unwrap_or(u64::MAX);
        half + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
    }

    fn allows(&self, idempotency: Idempotency) -> bool {
        idempotency.is_idempotent() || self.retry_writes
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: config.jitter,
            retry_writes: config.retry_writes,
        }
    }
}

/// Run `call` and re-run it after backoff while it ends in
/// `AllEndpointsFailed` and `policy` permits another try.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    idempotency: Idempotency,
    mut call: F,
) -> Result<T, FallbackError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FallbackError>>,
{
    let mut retry = 0;
    loop {
        match call().await {
            Err(err @ FallbackError::AllEndpointsFailed { .. })
                if retry < policy.max_retries && policy.allows(idempotency) =>
            {
                retry += 1;
                let delay = policy.delay(retry);
                tracing::warn!(
                    "{}; retrying in {}ms ({}/{})",
                    err,
                    delay.as_millis(),
                    retry,
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
            },
            other => return other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn all_failed() -> FallbackError {
        FallbackError::AllEndpointsFailed {
            operation: "posts.list".into(),
            attempts: vec![],
            last: Box::new(FallbackError::Unreachable { url: "u".into(), message: "refused".into() }),
        }
    }

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter: true,
            retry_writes: false,
        }
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            jitter: false,
            retry_writes: false,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn test_jittered_delay_stays_within_backoff() {
        let policy = RetryPolicy { jitter: true, ..quick(1) };
        for retry in 1..4 {
            let delay = policy.delay(retry);
            assert!(delay <= policy.backoff(retry));
            assert!(delay >= policy.backoff(retry) / 2);
        }
    }

    #[tokio::test]
    async fn test_retries_aggregate_failures_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&quick(3), Idempotency::Idempotent, || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(all_failed())
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_never_retries_writes_by_default() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&quick(3), Idempotency::NonIdempotent, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(all_failed())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&quick(3), Idempotency::Idempotent, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FallbackError::Validation { url: "u".into(), status: 422, message: "bad".into() })
        })
        .await;
        assert!(matches!(result, Err(FallbackError::Validation { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
