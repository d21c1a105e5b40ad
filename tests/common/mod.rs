#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use multiclip::clipboard::{ClipboardError, ClipboardSource};
use multiclip::engine::EngineSettings;
use multiclip::HistoryEngine;

/// Millisecond-scale settings so lifecycle tests finish quickly
pub fn fast_settings(max_history: usize) -> EngineSettings {
    EngineSettings {
        max_history,
        poll_interval: Duration::from_millis(2),
        retry_delay: Duration::from_millis(2),
        cooldown: Duration::from_millis(150),
        max_consecutive_errors: 5,
        shutdown_timeout: Duration::from_secs(2),
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

pub fn contents(engine: &HistoryEngine) -> Vec<String> {
    engine.get_history().into_iter().map(|e| e.content).collect()
}

/// Clipboard that always fails
#[derive(Debug, Default)]
pub struct FailingClipboard {
    pub reads: AtomicU64,
}

impl ClipboardSource for FailingClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(ClipboardError::Unavailable("no display".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Clipboard whose reads block for a fixed time, like a hung platform call
#[derive(Debug)]
pub struct BlockingClipboard {
    pub delay: Duration,
}

impl ClipboardSource for BlockingClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        thread::sleep(self.delay);
        Ok("slow".to_string())
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}

/// Clipboard that panics while armed
#[derive(Debug, Default)]
pub struct PanickingClipboard {
    pub armed: AtomicBool,
}

impl ClipboardSource for PanickingClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        if self.armed.load(Ordering::SeqCst) {
            panic!("clipboard backend blew up");
        }
        Ok("recovered".to_string())
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}
