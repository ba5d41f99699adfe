//! Bounded retries with linear backoff.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::Result;

/// Backoff added per failed attempt.
pub const BACKOFF_STEP: Duration = Duration::from_secs(30);

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never below one.
    pub max_attempts: u32,
    /// The n-th retry waits `n * backoff_step`.
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step: BACKOFF_STEP,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Sleep before the next attempt, or return `false` if none are left.
    pub async fn backoff(&self, failed_attempt: u32) -> bool {
        self.backoff_at_least(failed_attempt, Duration::ZERO).await
    }

    /// Like [`backoff`](Self::backoff), but never waits less than `minimum`.
    pub async fn backoff_at_least(&self, failed_attempt: u32, minimum: Duration) -> bool {
        if failed_attempt >= self.max_attempts {
            return false;
        }

        let delay = self.delay_for(failed_attempt).max(minimum);
        tracing::info!("Sleeping for {} seconds", delay.as_secs_f64());
        sleep(delay).await;
        tracing::info!("Retrying {}/{}", failed_attempt + 1, self.max_attempts);
        true
    }
}

/// Run `op` until it succeeds, retrying transient errors.
///
/// Non-transient errors and the last transient error are returned as is.
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                tracing::warn!("Failed to get {}: {}", what, e);
                let minimum = e.retry_after().unwrap_or(Duration::ZERO);
                if !policy.backoff_at_least(attempt, minimum).await {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::new(10);
        assert_eq!(policy.delay_for(1), Duration::from_secs(30));
        assert_eq!(policy.delay_for(2), Duration::from_secs(60));
        assert_eq!(policy.delay_for(5), Duration::from_secs(150));
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_until_success() {
        let policy = RetryPolicy::new(5);
        let calls = Cell::new(0);
        let start = Instant::now();

        let result = retry_transient(&policy, "page", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(Error::ServerError(502))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
        // 30s after the first failure, 60s after the second.
        assert_eq!(start.elapsed(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(3);
        let calls = Cell::new(0);

        let result: Result<()> = retry_transient(&policy, "page", || {
            calls.set(calls.get() + 1);
            async { Err(Error::RateLimited(1)) }
        })
        .await;

        assert!(matches!(result, Err(Error::RateLimited(_))));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_at_least_retry_after() {
        let policy = RetryPolicy::new(5);
        let calls = Cell::new(0);
        let start = Instant::now();

        let result = retry_transient(&policy, "page", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                match n {
                    1 => Err(Error::RateLimited(100)),
                    2 => Err(Error::RateLimited(5)),
                    _ => Ok(n),
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        // 100s asked by the server, then the 60s linear step wins over 5s.
        assert_eq!(start.elapsed(), Duration::from_secs(160));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_not_retried() {
        let policy = RetryPolicy::new(3);
        let calls = Cell::new(0);
        let start = Instant::now();

        let result: Result<()> = retry_transient(&policy, "page", || {
            calls.set(calls.get() + 1);
            async { Err(Error::Authentication("HTTP 401".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
