//! Lease expiry timers.

use std::future::Future;

use tokio::task::AbortHandle;
use tokio::time::{Instant, sleep_until};

/// Handle to a spawned expiry task.
///
/// Dropping the handle leaves the task running; only
/// [`cancel`](Self::cancel) stops it. The task itself re-validates the
/// lease before acting, so a cancel that loses the race is harmless.
#[derive(Debug)]
pub(crate) struct LeaseTimer {
    handle: AbortHandle,
}

impl LeaseTimer {
    /// Runs `on_expiry` once `deadline` is reached.
    pub(crate) fn spawn<F>(deadline: Instant, on_expiry: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            on_expiry.await;
        });
        Self {
            handle: task.abort_handle(),
        }
    }

    pub(crate) fn cancel(&self) {
        self.handle.abort();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
