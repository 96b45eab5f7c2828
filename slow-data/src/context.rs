//! Per-call execution context: cancellation plus an optional deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::DataError;

/// Bounds a single repository call.
///
/// Cloning shares the cancellation token, so a handler can hand a clone to
/// the repository and cancel it from elsewhere (e.g. on upstream disconnect).
/// The deadline covers the whole call, including the wait for a pooled
/// connection.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().timeout(timeout)
    }

    /// Set the deadline to `timeout` from now, keeping an earlier deadline if one is set.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// A context sharing this deadline whose cancellation does not propagate upwards.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` to completion unless the context is cancelled or its deadline passes first.
    ///
    /// The check happens before `fut` is polled, so an already-cancelled or
    /// expired context never touches storage.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, DataError>
    where
        F: Future<Output = Result<T, DataError>>,
    {
        if self.token.is_cancelled() {
            return Err(DataError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if deadline <= Instant::now() {
                return Err(DataError::DeadlineExceeded);
            }
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("storage call cancelled");
                Err(DataError::Cancelled)
            }
            _ = expired => {
                tracing::debug!("storage call exceeded its deadline");
                Err(DataError::DeadlineExceeded)
            }
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_result() {
        let ctx = ExecContext::new();
        let value = ctx.run(async { Ok::<_, DataError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn already_cancelled_fails_without_polling() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let polled = AtomicBool::new(false);
        let ctx = ExecContext::new();
        ctx.cancel();
        let err = ctx
            .run(async {
                polled.store(true, Ordering::SeqCst);
                Ok::<_, DataError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_slow_future() {
        let ctx = ExecContext::with_timeout(Duration::from_millis(50));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<_, DataError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn cancel_from_another_task() {
        let ctx = ExecContext::new();
        let handle = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });
        let err = ctx
            .run(std::future::pending::<Result<(), DataError>>())
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = ExecContext::new()
            .deadline(now + Duration::from_secs(1))
            .deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline_at(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn child_cancellation_does_not_propagate_up() {
        let parent = ExecContext::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
        parent.cancel();
        assert!(parent.child().is_cancelled());
    }
}
