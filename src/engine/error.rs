use thiserror::Error;

/// Errors returned to callers of the history engine
/// Clipboard read failures never appear here: the monitor absorbs them
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("max_history must be at least 1")]
    InvalidCapacity,

    #[error("max_consecutive_errors must be at least 1")]
    InvalidErrorThreshold,

    #[error("no history entry at index {index} (history holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to spawn monitor thread: {0}")]
    Spawn(#[from] std::io::Error),
}
