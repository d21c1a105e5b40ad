use std::sync::atomic::Ordering;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use super::backoff::{BackoffStep, ErrorBackoff};
use super::{EngineSettings, Shared};
use crate::clipboard::ClipboardSource;

/// Cooperative stop flag the monitor checks between polls and while sleeping
///
/// Each monitor run gets its own signal, so a run that outlives its stop
/// request keeps seeing "cancelled" even after a newer run has started.
#[derive(Debug, Default)]
pub struct CancelSignal {
    cancelled: Mutex<bool>,
    cvar: Condvar,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the monitor to stop and wake it if it is sleeping
    pub fn cancel(&self) {
        let mut cancelled = self
            .cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cancelled = true;
        self.cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sleep for `timeout` or until cancelled, whichever comes first
    /// Returns true if cancelled
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self
            .cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Loop over spurious wakeups
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = match self.cvar.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }

        *cancelled
    }
}

/// Body of the monitor thread: poll, record, sleep, until cancelled
pub(super) fn run(
    shared: &Shared,
    source: &dyn ClipboardSource,
    signal: &CancelSignal,
    settings: &EngineSettings,
) {
    log::info!("Clipboard monitoring thread started (source: {})", source.name());
    let mut backoff = ErrorBackoff::new(settings.backoff_policy());

    while !signal.is_cancelled() {
        shared.counters.polls.fetch_add(1, Ordering::Relaxed);

        let cancelled = match source.read_text() {
            // Stop requested while the read was in flight: drop the result
            Ok(_) if signal.is_cancelled() => true,
            Ok(content) => {
                shared.observe(content);
                backoff.record_success();
                signal.wait_timeout(settings.poll_interval)
            }
            Err(e) => {
                shared.counters.read_failures.fetch_add(1, Ordering::Relaxed);
                log::error!(
                    "Error reading clipboard (consecutive: {}): {}",
                    backoff.consecutive_errors() + 1,
                    e
                );

                match backoff.record_failure() {
                    BackoffStep::Cooldown(pause) => {
                        shared.counters.cooldowns.fetch_add(1, Ordering::Relaxed);
                        log::error!(
                            "Too many consecutive errors reading clipboard. Pausing monitoring for {:?}",
                            pause
                        );
                        signal.wait_timeout(pause)
                    }
                    BackoffStep::Retry(delay) => signal.wait_timeout(delay),
                }
            }
        };

        if cancelled {
            break;
        }
    }

    log::info!("Clipboard monitoring thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_times_out_when_not_cancelled() {
        let signal = CancelSignal::new();
        let start = Instant::now();

        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_wakes_long_wait() {
        let signal = Arc::new(CancelSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(60)))
        };

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        signal.cancel();

        assert!(waiter.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_already_cancelled_returns_immediately() {
        let signal = CancelSignal::new();
        signal.cancel();

        assert!(signal.is_cancelled());
        assert!(signal.wait_timeout(Duration::from_secs(60)));
    }
}
