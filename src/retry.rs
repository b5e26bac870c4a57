use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::ui;

/// How many times an action is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_secs(3),
        }
    }
}

/// Runs `action` until it succeeds or the policy's attempts are exhausted.
///
/// Each attempt is wrapped in a log group. The action receives the 1-based
/// attempt number. When every attempt fails, the last error is returned.
pub async fn retry<T, F, Fut>(name: &str, policy: RetryPolicy, mut action: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let title = format!("🔁 Start {} attempt: {}", attempt, name);
        match ui::group(&title, action(attempt)).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                tracing::warn!("Attempt {} of '{}' failed: {}", attempt, name, e);
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_first_success_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let value = retry("noop", instant(3), |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BotError>(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failure() {
        let value = retry("flaky", instant(2), |attempt| async move {
            if attempt == 1 {
                Err(BotError::precondition("transient"))
            } else {
                Ok(attempt)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_rethrows_last_failure() {
        let calls = AtomicU32::new(0);
        let err = retry("broken", instant(2), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(BotError::precondition(format!("attempt {}", attempt))) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(err.to_string().contains("attempt 2"));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let _ = retry("zero", instant(0), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(BotError::precondition("nope")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
