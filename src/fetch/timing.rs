//! Wall-clock timing for any future, used to report fetch latency.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Output of a future together with how long it took.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    /// Elapsed time in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Awaits `future` and records its duration.
pub async fn measure<F: Future>(future: F) -> Timed<F::Output> {
    let start = Instant::now();
    let value = future.await;

    Timed {
        value,
        elapsed: start.elapsed(),
    }
}
