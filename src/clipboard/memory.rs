use std::collections::VecDeque;
use std::sync::Mutex;

use super::source::{ClipboardError, ClipboardSource};

/// In-memory clipboard for headless runs and tests
///
/// Holds a current value plus a queue of scripted reads. Each read pops the
/// next scripted step if one is queued; otherwise it returns the current
/// value. A scripted text step also becomes the current value, so the last
/// scripted text keeps being observed once the script is exhausted.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    current: String,
    script: VecDeque<ScriptStep>,
    reads: u64,
}

#[derive(Debug)]
enum ScriptStep {
    Text(String),
    Fail(String),
}

impl MemoryClipboard {
    /// Create an empty in-memory clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory clipboard holding `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        let clipboard = Self::new();
        clipboard.set_text(text);
        clipboard
    }

    /// Replace the current clipboard value (a simulated copy)
    pub fn set_text(&self, text: impl Into<String>) {
        self.lock().current = text.into();
    }

    /// Queue a sequence of values to be returned by successive reads
    pub fn push_script<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        for value in values {
            state.script.push_back(ScriptStep::Text(value.into()));
        }
    }

    /// Queue `count` failing reads
    pub fn push_failures(&self, count: usize) {
        let mut state = self.lock();
        for i in 0..count {
            state
                .script
                .push_back(ScriptStep::Fail(format!("scripted failure #{}", i + 1)));
        }
    }

    /// Number of reads served so far
    pub fn reads(&self) -> u64 {
        self.lock().reads
    }

    /// Number of scripted steps not yet consumed
    pub fn pending(&self) -> usize {
        self.lock().script.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ClipboardSource for MemoryClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut state = self.lock();
        state.reads += 1;

        match state.script.pop_front() {
            Some(ScriptStep::Text(text)) => {
                state.current = text.clone();
                Ok(text)
            }
            Some(ScriptStep::Fail(reason)) => Err(ClipboardError::Access(reason)),
            None => Ok(state.current.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_current() {
        let clipboard = MemoryClipboard::with_text("initial");
        clipboard.push_script(["a", "b"]);

        assert_eq!(clipboard.read_text().unwrap(), "a");
        assert_eq!(clipboard.read_text().unwrap(), "b");
        // Script exhausted: last scripted value sticks
        assert_eq!(clipboard.read_text().unwrap(), "b");
        assert_eq!(clipboard.reads(), 3);
    }

    #[test]
    fn test_scripted_failures_do_not_change_current() {
        let clipboard = MemoryClipboard::with_text("kept");
        clipboard.push_failures(2);

        assert!(clipboard.read_text().is_err());
        assert!(clipboard.read_text().is_err());
        assert_eq!(clipboard.read_text().unwrap(), "kept");
        assert_eq!(clipboard.pending(), 0);
    }
}
