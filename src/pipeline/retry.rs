//! Bounded retry with a fixed delay.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::models::DetailConfig;

/// Retry policy: `retries` extra attempts after the first, `delay` between
/// attempts. There is no backoff; the delay is the same every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// A policy that runs the operation exactly once.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &DetailConfig) -> Self {
        Self::new(config.retries, Duration::from_millis(config.retry_delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Run `op` until it succeeds or the attempts are exhausted.
    ///
    /// `op` receives the 1-based attempt number. The last error is returned
    /// when every attempt fails.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts => {
                    log::warn!("{label}: attempt {attempt}/{max_attempts} failed: {e}");
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    log::warn!("{label}: giving up after {max_attempts} attempt(s): {e}");
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DetailConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::AppError;

    fn flaky(calls: &AtomicU32, fail_first: u32) -> Result<u32> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= fail_first {
            Err(AppError::render("https://example.com", format!("failure {n}")))
        } else {
            Ok(n)
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 2);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::ZERO);

        let result = policy.run("test", move |_| async move { flaky(calls, 2) }).await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::ZERO);

        let result = policy.run("test", move |_| async move { flaky(calls, 10) }).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failure 3"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retries_runs_once() {
        let calls = &AtomicU32::new(0);
        let result = RetryPolicy::none()
            .run("test", move |_| async move { flaky(calls, 1) })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_numbers_are_passed() {
        let seen = &std::sync::Mutex::new(Vec::new());
        let policy = RetryPolicy::new(1, Duration::ZERO);

        let _ = policy
            .run("test", move |attempt| {
                seen.lock().unwrap().push(attempt);
                async { Err::<(), _>(AppError::unexpected("nope")) }
            })
            .await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_delay_between_attempts() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(1, Duration::from_millis(30));

        let start = std::time::Instant::now();
        let _ = policy.run("test", move |_| async move { flaky(calls, 1) }).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
