//! TTL Expiry Timers
//!
//! Each key written with a TTL gets its own scheduled task. When the task
//! wakes it runs the store's removal future; the store decides whether the
//! entry the timer was armed for is still the current one.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Handle to a pending per-key expiry.
///
/// Dropping the handle detaches the task; call [`ExpiryTimer::cancel`] to
/// stop it from firing.
#[derive(Debug)]
pub struct ExpiryTimer {
    handle: JoinHandle<()>,
}

impl ExpiryTimer {
    /// Spawns a task that sleeps until `deadline` and then awaits `on_expire`.
    ///
    /// `on_expire` resolves to `true` when it actually removed an entry.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(key: String, deadline: Instant, on_expire: F) -> Self
    where
        F: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            if on_expire.await {
                debug!("TTL expiry: removed key '{}'", key);
            } else {
                debug!("TTL expiry: key '{}' was already replaced or removed", key);
            }
        });

        Self { handle }
    }

    /// Stops the timer. A timer that already fired is unaffected.
    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Returns true once the timer has fired or been cancelled.
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
