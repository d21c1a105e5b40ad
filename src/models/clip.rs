use std::collections::VecDeque;
use std::time::SystemTime;

/// Number of characters shown when a clip is logged
const LOG_PREVIEW_CHARS: usize = 30;

/// A single recorded clipboard value with its capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When this value was captured
    pub timestamp: SystemTime,
    /// The clipboard text
    pub content: String,
}

impl HistoryEntry {
    /// Create a new entry stamped with the current time
    pub fn new(content: String) -> Self {
        HistoryEntry {
            timestamp: SystemTime::now(),
            content,
        }
    }

    /// Get a single-line preview string (truncated for display)
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.content, max_chars)
    }
}

/// Single-line, char-boundary-safe preview of `text`
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

/// True for content the history never records: empty or whitespace-only
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Why an insertion attempt was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or whitespace-only content
    Blank,
    /// Same content as the current most recent entry
    DuplicateOfFront,
}

/// Result of offering content to the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored as the new front entry; carries the entry evicted to make room
    Inserted { evicted: Option<HistoryEntry> },
    /// Not stored
    Rejected(Rejection),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Bounded clipboard history
/// Entries are kept in insertion order (most recent first)
#[derive(Debug, Clone)]
pub struct ClipboardHistory {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl ClipboardHistory {
    /// Create a new clipboard history holding at most `max_entries`
    /// Callers validate that `max_entries` is positive
    pub fn new(max_entries: usize) -> Self {
        ClipboardHistory {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Offer new content to the history
    ///
    /// Blank content and content equal to the current front entry are
    /// rejected. Only the front entry is compared, so A, B, A yields two
    /// separate entries for A. At capacity the oldest entry is evicted.
    pub fn insert(&mut self, content: String) -> InsertOutcome {
        if is_blank(&content) {
            log::debug!("Skipping empty or whitespace-only clip");
            return InsertOutcome::Rejected(Rejection::Blank);
        }

        if self.front().is_some_and(|e| e.content == content) {
            log::debug!("Skipping duplicate clip: {}", preview(&content, LOG_PREVIEW_CHARS));
            return InsertOutcome::Rejected(Rejection::DuplicateOfFront);
        }

        let evicted = if self.entries.len() >= self.max_entries {
            self.entries.pop_back()
        } else {
            None
        };

        log::info!("Adding new clip to history: {}", preview(&content, LOG_PREVIEW_CHARS));
        self.entries.push_front(HistoryEntry::new(content));

        InsertOutcome::Inserted { evicted }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Most recent entry
    pub fn front(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entry at `index` (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Independent copy of all entries, most recent first
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate entries, most recent first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Get the number of entries in the history
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
