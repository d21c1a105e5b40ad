//! Multiclip - clipboard history engine
//!
//! A bounded, deduplicating history of copied text, fed by a background
//! thread that polls the clipboard.

pub mod clipboard;
pub mod engine;
pub mod logging;
pub mod models;
pub mod storage;
pub mod watch;

pub use clipboard::{ClipboardError, ClipboardSource};
pub use engine::{EngineError, EngineSettings, HistoryEngine, MonitorState, MonitorStats};
pub use models::HistoryEntry;
