//! Periodic execution of monitoring passes.
//!
//! The first pass starts immediately; later passes start every `interval`.
//! A pass that overruns the interval delays the next one instead of
//! triggering a burst of catch-up passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Call `pass` every `interval` until `cancel` is triggered.
///
/// Returns the number of passes that ran. Cancellation is observed between
/// passes; a pass in progress is allowed to finish.
pub async fn run_periodically<F, Fut>(
    interval: Duration,
    cancel: CancellationToken,
    mut pass: F,
) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tracing::info!(interval_secs = interval.as_secs(), "Periodic monitoring started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut passes = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(passes, "Periodic monitoring stopping");
                break;
            }
            _ = ticker.tick() => {
                pass().await;
                passes += 1;
            }
        }
    }
    passes
}
