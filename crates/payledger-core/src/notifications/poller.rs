//! Repeating timer that drives the scheduler.
//!
//! One poller owns at most one live timer task. Re-initializing cancels the
//! previous task before spawning the new one, so repeated `init` calls never
//! produce duplicate firings.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Fixed polling cadence.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Shortest accepted interval; tokio rejects a zero period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Longest accepted interval; keeps the first deadline representable.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug)]
pub struct NotificationPoller {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl NotificationPoller {
    pub fn new() -> Self {
        Self::with_interval(POLL_INTERVAL)
    }

    /// Poll every `interval`, clamped to
    /// [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`].
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL),
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Install the timer, replacing any previous one.
    ///
    /// The first firing happens one interval from now. Must be called from
    /// within a tokio runtime.
    pub fn init<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.shutdown();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });
        debug!(interval_secs = period.as_secs(), "notification poller installed");
        self.handle = Some(handle);
    }

    /// Cancel the timer. Safe to call when none is installed.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("notification poller cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for NotificationPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
