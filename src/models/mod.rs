pub mod clip;
pub mod pinned;

pub use clip::{ClipboardHistory, HistoryEntry, InsertOutcome, Rejection};
pub use pinned::{PinnedClips, SequentialPaste};
