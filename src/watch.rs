use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::engine::{HistoryEngine, MonitorStats};

/// Why the watch loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// Shutdown requested (Ctrl+C)
    Interrupted,
    /// The requested run time elapsed
    DurationElapsed,
}

/// Drive a running engine until shutdown is requested or `duration` elapses
///
/// `on_tick` runs immediately and then every `tick_interval`. The loop
/// blocks on `shutdown` between ticks, so a request wakes it at once. A
/// dropped sender counts as a shutdown request. Monitoring is always stopped
/// before returning.
pub fn run_watch(
    engine: &HistoryEngine,
    shutdown: &Receiver<()>,
    tick_interval: Duration,
    duration: Option<Duration>,
    mut on_tick: impl FnMut(&HistoryEngine),
) -> (WatchExit, MonitorStats) {
    let deadline = duration.map(|d| Instant::now() + d);

    let exit = loop {
        on_tick(engine);

        let wait_for = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break WatchExit::DurationElapsed;
                }
                remaining.min(tick_interval)
            }
            None => tick_interval,
        };

        match shutdown.recv_timeout(wait_for) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                log::info!("Shutdown requested, stopping watch");
                break WatchExit::Interrupted;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    };

    engine.stop_monitoring();
    (exit, engine.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::engine::{EngineSettings, MonitorState};
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;

    fn running_engine() -> HistoryEngine {
        let settings = EngineSettings {
            poll_interval: Duration::from_millis(2),
            ..EngineSettings::default()
        };
        let engine =
            HistoryEngine::with_settings(Arc::new(MemoryClipboard::with_text("x")), settings).unwrap();
        engine.start_monitoring().unwrap();
        engine
    }

    #[test]
    fn test_interrupt_stops_monitoring_promptly() {
        let engine = running_engine();
        let (tx, rx) = mpsc::channel();

        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            tx.send(()).unwrap();
            // Keep the sender alive past the send
            thread::sleep(Duration::from_millis(100));
        });

        let started = Instant::now();
        let mut ticks = 0;
        let (exit, stats) = run_watch(&engine, &rx, Duration::from_secs(60), None, |_| ticks += 1);

        assert_eq!(exit, WatchExit::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(ticks, 1);
        assert_eq!(engine.monitor_state(), MonitorState::Idle);
        assert_eq!(stats.live_monitors, 0);
        sender.join().unwrap();
    }

    #[test]
    fn test_duration_elapses_and_stops() {
        let engine = running_engine();
        let (_tx, rx) = mpsc::channel::<()>();

        let mut ticks = 0;
        let (exit, _) = run_watch(
            &engine,
            &rx,
            Duration::from_millis(10),
            Some(Duration::from_millis(50)),
            |e| {
                assert_eq!(e.get_history().len(), 1);
                ticks += 1;
            },
        );

        assert_eq!(exit, WatchExit::DurationElapsed);
        assert!(ticks >= 2);
        assert_eq!(engine.monitor_state(), MonitorState::Idle);
    }

    #[test]
    fn test_dropped_sender_counts_as_shutdown() {
        let engine = running_engine();
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);

        let (exit, _) = run_watch(&engine, &rx, Duration::from_secs(60), None, |_| {});

        assert_eq!(exit, WatchExit::Interrupted);
        assert!(!engine.is_monitoring());
    }
}
