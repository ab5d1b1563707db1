//! Advisory deadlines placed on a context by the timeout stage.

use crate::errors::{PipelineError, PipelineResult};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct CancelState {
    /// Set only after `reason` has been written.
    cancelled: AtomicBool,
    /// First reason wins.
    reason: RwLock<Option<String>>,
}

/// A deadline with a cooperative cancellation handle.
///
/// The deadline owns no timer or background task. It is checked on demand by
/// the stages that care about it, so dropping the context that carries it
/// releases everything.
#[derive(Debug, Clone)]
pub struct Deadline {
    /// `None` when `now + timeout` is not representable: the deadline never
    /// expires.
    expires_at: Option<Instant>,
    timeout: Duration,
    state: Arc<CancelState>,
}

impl Deadline {
    /// Creates a deadline `timeout` from now.
    ///
    /// A timeout too large to be represented as an [`Instant`] never expires.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
            timeout,
            state: Arc::new(CancelState::default()),
        }
    }

    /// The instant at which the deadline expires, or `None` if it never does.
    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// The configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before expiry, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.map_or(Duration::MAX, |at| {
            at.saturating_duration_since(Instant::now())
        })
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// Requests cancellation. Idempotent; the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut slot = self.state.reason.write();
        if slot.is_none() {
            *slot = Some(reason.into());
            self.state.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<String> {
        self.state.reason.read().clone()
    }

    /// Fails if the deadline was cancelled or has expired.
    pub fn check(&self) -> PipelineResult<()> {
        if self.is_cancelled() {
            return Err(PipelineError::Cancelled {
                reason: self.cancel_reason().unwrap_or_default(),
            });
        }
        if self.is_expired() {
            return Err(PipelineError::DeadlineExceeded {
                timeout: self.timeout,
            });
        }
        Ok(())
    }

    /// Awaits `fut`, giving up when the deadline passes.
    ///
    /// The timer only lives for the duration of this call.
    pub async fn run<F>(&self, fut: F) -> PipelineResult<F::Output>
    where
        F: Future,
    {
        self.check()?;
        let Some(expires_at) = self.expires_at else {
            return Ok(fut.await);
        };
        tokio::time::timeout_at(expires_at.into(), fut)
            .await
            .map_err(|_| PipelineError::DeadlineExceeded {
                timeout: self.timeout,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_deadline_passes_check() {
        let deadline = Deadline::after(Duration::from_secs(30));
        assert!(!deadline.is_expired());
        assert!(deadline.remaining() > Duration::from_secs(29));
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
        let err = deadline.check().unwrap_err();
        assert!(matches!(err, PipelineError::DeadlineExceeded { .. }));
    }

    #[test]
    fn test_unrepresentable_timeout_never_expires() {
        let deadline = Deadline::after(Duration::MAX);
        assert_eq!(deadline.expires_at(), None);
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::MAX);
        assert!(deadline.check().is_ok());
    }

    #[tokio::test]
    async fn test_run_without_expiry_awaits_future() {
        let deadline = Deadline::after(Duration::MAX);
        let value = deadline.run(async { "done" }).await.unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn test_concurrent_cancel_never_exposes_empty_reason() {
        for _ in 0..200 {
            let deadline = Deadline::after(Duration::from_secs(60));
            let canceller = deadline.clone();

            let observer = std::thread::spawn(move || loop {
                match deadline.check() {
                    Ok(()) => std::hint::spin_loop(),
                    Err(err) => break err,
                }
            });
            canceller.cancel("shutdown");

            let err = observer.join().unwrap();
            assert_eq!(err.to_string(), "cancelled: shutdown");
        }
    }

    #[test]
    fn test_cancel_first_reason_wins() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let shared = deadline.clone();

        shared.cancel("client went away");
        deadline.cancel("second");

        assert!(deadline.is_cancelled());
        assert_eq!(deadline.cancel_reason().as_deref(), Some("client went away"));
        let err = deadline.check().unwrap_err();
        assert_eq!(err.to_string(), "cancelled: client went away");
    }

    #[tokio::test]
    async fn test_run_completes_within_deadline() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let value = deadline.run(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let deadline = Deadline::after(Duration::from_millis(20));
        let result = deadline
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(matches!(result, Err(PipelineError::DeadlineExceeded { .. })));
    }
}
