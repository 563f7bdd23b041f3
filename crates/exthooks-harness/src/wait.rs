//! Bounded polling.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::error::HarnessResult;

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The check returned `true`.
    Satisfied { elapsed: Duration, polls: u32 },
    /// The budget ran out first.
    TimedOut {
        polls: u32,
        last_error: Option<String>,
    },
}

impl PollOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Call `check` every `interval` until it returns `Ok(true)` or `timeout`
/// elapses.
///
/// Errors from `check` count as "not yet": pages under test reload and
/// evaluation fails transiently while they do. The most recent error is
/// reported if the wait times out.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<bool>>,
{
    let start = Instant::now();
    let mut polls = 0u32;
    let mut last_error = None;

    let waited = tokio::time::timeout(timeout, async {
        loop {
            polls += 1;
            match check().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => {
                    trace!(error = %e, polls, "Poll check failed");
                    last_error = Some(e.to_string());
                }
            }
            tokio::time::sleep(interval).await;
        }
    })
    .await;

    match waited {
        Ok(()) => PollOutcome::Satisfied {
            elapsed: start.elapsed(),
            polls,
        },
        Err(_) => PollOutcome::TimedOut { polls, last_error },
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use std::cell::Cell;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::from_micros(999)), 0);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_satisfied_after_some_polls() {
        let calls = Cell::new(0u32);
        let outcome = poll_until(Duration::from_secs(5), Duration::from_millis(100), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() >= 4;
            async move { Ok(ready) }
        })
        .await;

        assert_eq!(
            outcome,
            PollOutcome::Satisfied {
                elapsed: Duration::from_millis(300),
                polls: 4
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_retried_and_reported_on_timeout() {
        let outcome = poll_until(Duration::from_secs(1), Duration::from_millis(100), || async {
            Err::<bool, _>(HarnessError::Evaluation {
                context: "probe",
                reason: "Execution context was destroyed".into(),
            })
        })
        .await;

        match outcome {
            PollOutcome::TimedOut { polls, last_error } => {
                assert!(polls >= 10);
                assert!(last_error.is_some_and(|e| e.contains("context was destroyed")));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_then_success_is_satisfied() {
        let calls = Cell::new(0u32);
        let outcome = poll_until(Duration::from_secs(1), Duration::from_millis(50), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n == 1 {
                    Err(HarnessError::SessionClosed)
                } else {
                    Ok(true)
                }
            }
        })
        .await;
        assert!(outcome.is_satisfied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_ready_times_out_without_error() {
        let outcome =
            poll_until(Duration::from_millis(250), Duration::from_millis(100), || async {
                Ok(false)
            })
            .await;
        assert!(matches!(
            outcome,
            PollOutcome::TimedOut {
                last_error: None,
                ..
            }
        ));
    }
}
