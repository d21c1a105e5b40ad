use std::collections::BTreeMap;

use super::clip::{ClipboardHistory, HistoryEntry};

/// Clips pinned under a hotkey character
///
/// Pins are copies kept outside the bounded history: they never count
/// against its capacity and survive `clear`.
#[derive(Debug, Clone, Default)]
pub struct PinnedClips {
    pins: BTreeMap<char, HistoryEntry>,
}

impl PinnedClips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `entry` under `key`, returning the pin it replaced
    pub fn pin(&mut self, key: char, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.pins.insert(key, entry)
    }

    /// Remove the pin under `key`
    pub fn unpin(&mut self, key: char) -> Option<HistoryEntry> {
        self.pins.remove(&key)
    }

    /// Independent copy of all pins, ordered by key
    pub fn snapshot(&self) -> BTreeMap<char, HistoryEntry> {
        self.pins.clone()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

/// Cursor for pasting history entries one after another
///
/// Walks the history oldest-first (the order the clips were copied) and
/// wraps back to the oldest after the newest.
#[derive(Debug, Clone, Default)]
pub struct SequentialPaste {
    active: bool,
    cursor: usize,
}

impl SequentialPaste {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip sequential mode on/off and rewind the cursor
    /// Returns the new mode
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.cursor = 0;
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Next clip in copy order, or None when inactive or history is empty
    pub fn next_clip(&mut self, history: &ClipboardHistory) -> Option<String> {
        if !self.active || history.is_empty() {
            return None;
        }

        // History shrank (clear/eviction) under the cursor
        if self.cursor >= history.len() {
            self.cursor = 0;
        }

        let content = history.iter().rev().nth(self.cursor)?.content.clone();
        self.cursor = (self.cursor + 1) % history.len();
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(items: &[&str]) -> ClipboardHistory {
        let mut history = ClipboardHistory::new(10);
        for item in items {
            history.insert(item.to_string());
        }
        history
    }

    #[test]
    fn test_pin_replace_and_unpin() {
        let mut pins = PinnedClips::new();

        assert!(pins.pin('a', HistoryEntry::new("one".to_string())).is_none());
        let replaced = pins.pin('a', HistoryEntry::new("two".to_string()));
        assert_eq!(replaced.map(|e| e.content), Some("one".to_string()));
        assert_eq!(pins.len(), 1);

        assert_eq!(pins.unpin('a').map(|e| e.content), Some("two".to_string()));
        assert!(pins.unpin('a').is_none());
        assert!(pins.is_empty());
    }

    #[test]
    fn test_sequential_inactive_returns_none() {
        let history = history_of(&["a", "b"]);
        let mut seq = SequentialPaste::new();

        assert!(!seq.is_active());
        assert_eq!(seq.next_clip(&history), None);
    }

    #[test]
    fn test_sequential_walks_oldest_first_and_wraps() {
        let history = history_of(&["first", "second", "third"]);
        let mut seq = SequentialPaste::new();
        assert!(seq.toggle());

        let pasted: Vec<String> = (0..4).filter_map(|_| seq.next_clip(&history)).collect();
        assert_eq!(pasted, vec!["first", "second", "third", "first"]);
    }

    #[test]
    fn test_sequential_toggle_rewinds() {
        let history = history_of(&["x", "y"]);
        let mut seq = SequentialPaste::new();
        seq.toggle();
        seq.next_clip(&history);

        assert!(!seq.toggle());
        assert!(seq.toggle());
        assert_eq!(seq.next_clip(&history), Some("x".to_string()));
    }

    #[test]
    fn test_sequential_cursor_wraps_after_shrink() {
        let mut history = history_of(&["a", "b", "c"]);
        let mut seq = SequentialPaste::new();
        seq.toggle();
        seq.next_clip(&history);
        seq.next_clip(&history);

        history.clear();
        assert_eq!(seq.next_clip(&history), None);

        history.insert("only".to_string());
        assert_eq!(seq.next_clip(&history), Some("only".to_string()));
    }
}
