//! Clipboard history engine
//!
//! `HistoryEngine` owns the bounded history and a single background monitor
//! thread that polls a `ClipboardSource`. Two mutexes split the shared state:
//! one guards the history data (history, dedup cursor, pins, sequential
//! cursor), the other guards the monitor lifecycle. The monitor only takes
//! the data lock to record a clip and the lifecycle lock when it crashes.

pub mod backoff;
pub mod error;
pub mod monitor;

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clipboard::ClipboardSource;
use crate::models::{ClipboardHistory, HistoryEntry, PinnedClips, SequentialPaste, clip};

pub use backoff::{BackoffPolicy, BackoffStep, ErrorBackoff};
pub use error::EngineError;
pub use monitor::CancelSignal;

/// Default number of clips kept
pub const DEFAULT_MAX_HISTORY: usize = 25;

const MONITOR_THREAD_NAME: &str = "multiclip-monitor";

/// Engine tuning; every interval is configurable so tests can run fast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Maximum number of history entries
    pub max_history: usize,
    /// Sleep between successful polls
    pub poll_interval: Duration,
    /// Sleep after an isolated read failure
    pub retry_delay: Duration,
    /// Sleep once `max_consecutive_errors` failures pile up
    pub cooldown: Duration,
    /// Consecutive failures that trigger the cooldown
    pub max_consecutive_errors: u32,
    /// How long `stop_monitoring` waits for the thread to exit
    pub shutdown_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_history: DEFAULT_MAX_HISTORY,
            poll_interval: Duration::from_millis(500),
            retry_delay: Duration::from_secs(5),
            cooldown: Duration::from_secs(60),
            max_consecutive_errors: 5,
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}

impl EngineSettings {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            retry_delay: self.retry_delay,
            cooldown: self.cooldown,
            max_consecutive_errors: self.max_consecutive_errors,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_history == 0 {
            return Err(EngineError::InvalidCapacity);
        }
        if self.max_consecutive_errors == 0 {
            return Err(EngineError::InvalidErrorThreshold);
        }
        Ok(())
    }
}

/// Monitor lifecycle state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No monitor thread
    #[default]
    Idle,
    /// Monitor thread polling
    Running,
    /// Stop requested, waiting for the thread to exit
    Stopping,
    /// Monitor thread died from a panic; the next start replaces it
    Crashed,
}

/// Point-in-time copy of the monitor counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    /// Clipboard reads attempted
    pub polls: u64,
    /// Reads that failed
    pub read_failures: u64,
    /// Cooldowns entered after repeated failures
    pub cooldowns: u64,
    /// Clips recorded by the monitor
    pub insertions: u64,
    /// Monitor threads currently alive (lingering ones included)
    pub live_monitors: usize,
}

#[derive(Debug, Default)]
struct MonitorCounters {
    polls: AtomicU64,
    read_failures: AtomicU64,
    cooldowns: AtomicU64,
    insertions: AtomicU64,
    live_monitors: AtomicUsize,
}

/// Everything guarded by the data lock
#[derive(Debug)]
struct HistoryState {
    history: ClipboardHistory,
    /// Last clipboard value confirmed recorded
    last_observed: Option<String>,
    pinned: PinnedClips,
    sequential: SequentialPaste,
}

/// A started monitor thread
struct MonitorRun {
    handle: JoinHandle<()>,
    signal: Arc<CancelSignal>,
    exited: Receiver<()>,
}

struct Lifecycle {
    state: MonitorState,
    /// Bumped on every start so a stale thread cannot touch newer state
    generation: u64,
    run: Option<MonitorRun>,
}

struct Shared {
    data: Mutex<HistoryState>,
    lifecycle: Mutex<Lifecycle>,
    counters: MonitorCounters,
}

impl Shared {
    fn lock_data(&self) -> MutexGuard<'_, HistoryState> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a successful clipboard read
    fn observe(&self, content: String) {
        let mut state = self.lock_data();

        if state.last_observed.as_deref() == Some(content.as_str()) {
            return;
        }

        log::debug!("Detected potential new clip: {}", clip::preview(&content, 30));
        if state.history.insert(content.clone()).is_inserted() {
            state.last_observed = Some(content);
            self.counters.insertions.fetch_add(1, Ordering::Relaxed);
            log::info!("Clipboard history updated ({} entries)", state.history.len());
        }
    }

    /// Called from a monitor thread that panicked
    fn mark_crashed(&self, generation: u64) {
        let mut lifecycle = self.lock_lifecycle();
        if lifecycle.generation == generation && lifecycle.state == MonitorState::Running {
            lifecycle.state = MonitorState::Crashed;
        }
    }
}

/// Bounded, deduplicating clipboard history fed by a background monitor
///
/// All methods take `&self` and are safe to call from any thread. Entries
/// are only ever added by the monitor (and the initial snapshot taken at
/// construction).
pub struct HistoryEngine {
    shared: Arc<Shared>,
    source: Arc<dyn ClipboardSource>,
    settings: EngineSettings,
}

impl HistoryEngine {
    /// Create an engine with default settings and the given capacity
    pub fn new(source: Arc<dyn ClipboardSource>, max_history: usize) -> Result<Self, EngineError> {
        Self::with_settings(
            source,
            EngineSettings {
                max_history,
                ..EngineSettings::default()
            },
        )
    }

    /// Create an engine
    ///
    /// Reads the clipboard once: non-blank text becomes the first entry and
    /// the initial dedup cursor. The monitor is not started.
    pub fn with_settings(
        source: Arc<dyn ClipboardSource>,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        log::info!(
            "Initializing clipboard history with max history: {}",
            settings.max_history
        );

        let mut history = ClipboardHistory::new(settings.max_history);
        let mut last_observed = None;

        match source.read_text() {
            Ok(text) if !clip::is_blank(&text) => {
                log::info!("Adding initial clipboard content to history");
                history.insert(text.clone());
                last_observed = Some(text);
            }
            Ok(_) => log::info!("Initial clipboard is empty"),
            Err(e) => log::warn!("Initial clipboard read failed: {}", e),
        }

        let shared = Shared {
            data: Mutex::new(HistoryState {
                history,
                last_observed,
                pinned: PinnedClips::new(),
                sequential: SequentialPaste::new(),
            }),
            lifecycle: Mutex::new(Lifecycle {
                state: MonitorState::Idle,
                generation: 0,
                run: None,
            }),
            counters: MonitorCounters::default(),
        };

        Ok(HistoryEngine {
            shared: Arc::new(shared),
            source,
            settings,
        })
    }

    /// Start the background monitor
    ///
    /// No-op (logged) when already running or still stopping. A crashed
    /// monitor is discarded and replaced. Returns without waiting for the
    /// first poll.
    pub fn start_monitoring(&self) -> Result<(), EngineError> {
        let mut lifecycle = self.shared.lock_lifecycle();

        match lifecycle.state {
            MonitorState::Running => {
                let dead = lifecycle
                    .run
                    .as_ref()
                    .is_none_or(|run| run.handle.is_finished());
                if !dead {
                    log::warn!("Monitoring is already active");
                    return Ok(());
                }
                log::warn!("Monitor thread exited unexpectedly. Restarting.");
            }
            MonitorState::Stopping => {
                log::warn!("Monitor is still stopping, start ignored");
                return Ok(());
            }
            MonitorState::Crashed => {
                log::warn!("Previous monitor thread crashed. Cleaning up.");
            }
            MonitorState::Idle => {}
        }

        if let Some(old) = lifecycle.run.take() {
            old.signal.cancel();
            if old.handle.is_finished() {
                let _ = old.handle.join();
            }
        }

        log::info!("Starting clipboard monitor...");
        let generation = lifecycle.generation + 1;
        let run = self.spawn_monitor(generation)?;

        lifecycle.generation = generation;
        lifecycle.run = Some(run);
        lifecycle.state = MonitorState::Running;

        Ok(())
    }

    fn spawn_monitor(&self, generation: u64) -> Result<MonitorRun, EngineError> {
        let signal = Arc::new(CancelSignal::new());
        let (exit_tx, exited) = mpsc::channel();

        let shared = Arc::clone(&self.shared);
        let source = Arc::clone(&self.source);
        let thread_signal = Arc::clone(&signal);
        let settings = self.settings.clone();

        let handle = thread::Builder::new()
            .name(MONITOR_THREAD_NAME.to_string())
            .spawn(move || {
                shared.counters.live_monitors.fetch_add(1, Ordering::SeqCst);

                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    monitor::run(&shared, source.as_ref(), &thread_signal, &settings)
                }));
                if result.is_err() {
                    log::error!("Clipboard monitor thread panicked");
                    shared.mark_crashed(generation);
                }

                shared.counters.live_monitors.fetch_sub(1, Ordering::SeqCst);
                let _ = exit_tx.send(());
            })?;

        Ok(MonitorRun {
            handle,
            signal,
            exited,
        })
    }

    /// Stop the background monitor
    ///
    /// No-op (logged) when not running. Waits at most the shutdown timeout
    /// for the thread to exit; a thread that misses the deadline is detached
    /// and exits at its next cancellation check.
    pub fn stop_monitoring(&self) {
        let run = {
            let mut lifecycle = self.shared.lock_lifecycle();
            match lifecycle.state {
                MonitorState::Running | MonitorState::Crashed => {}
                MonitorState::Idle => {
                    log::warn!("Monitoring is not active, cannot stop");
                    return;
                }
                MonitorState::Stopping => {
                    log::warn!("Monitor is already stopping");
                    return;
                }
            }
            lifecycle.state = MonitorState::Stopping;
            lifecycle.run.take()
        };

        log::info!("Stopping clipboard monitor...");
        if let Some(run) = run {
            run.signal.cancel();
            match run.exited.recv_timeout(self.settings.shutdown_timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    let _ = run.handle.join();
                    log::info!("Monitoring thread joined successfully");
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Monitoring thread did not stop gracefully after {:?}",
                        self.settings.shutdown_timeout
                    );
                }
            }
        }

        self.shared.lock_lifecycle().state = MonitorState::Idle;
    }

    /// Current lifecycle state
    pub fn monitor_state(&self) -> MonitorState {
        self.shared.lock_lifecycle().state
    }

    /// True while a monitor thread is polling
    pub fn is_monitoring(&self) -> bool {
        self.monitor_state() == MonitorState::Running
    }

    /// Snapshot of the history, most recent first
    pub fn get_history(&self) -> Vec<HistoryEntry> {
        self.shared.lock_data().history.snapshot()
    }

    /// Remove every history entry
    /// Leaves the dedup cursor, pins, and monitor state untouched
    pub fn clear_history(&self) {
        log::info!("Clearing clipboard history");
        self.shared.lock_data().history.clear();
    }

    /// Last clipboard value the monitor recorded
    pub fn last_observed(&self) -> Option<String> {
        self.shared.lock_data().last_observed.clone()
    }

    /// Pin history entry `index` (0 = most recent) under `key`
    /// Replaces any earlier pin under the same key
    pub fn pin_clip(&self, key: char, index: usize) -> Result<(), EngineError> {
        let mut state = self.shared.lock_data();
        let entry = state
            .history
            .get(index)
            .cloned()
            .ok_or(EngineError::IndexOutOfRange {
                index,
                len: state.history.len(),
            })?;

        log::info!("Pinning clip #{} under '{}'", index + 1, key);
        if state.pinned.pin(key, entry).is_some() {
            log::debug!("Replaced existing pin under '{}'", key);
        }
        Ok(())
    }

    /// Remove the pin under `key`, returning it
    pub fn unpin_clip(&self, key: char) -> Option<HistoryEntry> {
        let removed = self.shared.lock_data().pinned.unpin(key);
        if removed.is_none() {
            log::debug!("No clip pinned under '{}'", key);
        }
        removed
    }

    /// Snapshot of all pins, ordered by key
    pub fn get_pinned_clips(&self) -> BTreeMap<char, HistoryEntry> {
        self.shared.lock_data().pinned.snapshot()
    }

    /// Flip sequential paste mode; returns the new mode
    pub fn toggle_sequential_paste(&self) -> bool {
        let active = self.shared.lock_data().sequential.toggle();
        log::info!(
            "Sequential paste {}",
            if active { "enabled" } else { "disabled" }
        );
        active
    }

    /// Next clip in copy order while sequential paste is on
    pub fn get_next_sequential_clip(&self) -> Option<String> {
        let mut guard = self.shared.lock_data();
        let state = &mut *guard;
        state.sequential.next_clip(&state.history)
    }

    /// Snapshot of the monitor counters
    pub fn stats(&self) -> MonitorStats {
        let c = &self.shared.counters;
        MonitorStats {
            polls: c.polls.load(Ordering::Relaxed),
            read_failures: c.read_failures.load(Ordering::Relaxed),
            cooldowns: c.cooldowns.load(Ordering::Relaxed),
            insertions: c.insertions.load(Ordering::Relaxed),
            live_monitors: c.live_monitors.load(Ordering::SeqCst),
        }
    }
}

impl Drop for HistoryEngine {
    fn drop(&mut self) {
        // Detach without waiting; the thread exits at its next check
        if let Some(run) = self.shared.lock_lifecycle().run.take() {
            run.signal.cancel();
        }
    }
}
