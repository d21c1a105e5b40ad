use thiserror::Error;

/// Failure reading the system clipboard
///
/// Every variant is transient from the monitor's point of view: the poll is
/// retried under the backoff policy and never surfaced to callers.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No clipboard is reachable (headless session, missing display server)
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The clipboard exists but could not be read right now (held by another
    /// process, permission denied, platform error)
    #[error("clipboard access failed: {0}")]
    Access(String),

    /// The clipboard holds data that cannot be coerced to text
    #[error("clipboard content is not text: {0}")]
    NonText(String),
}

/// Trait for clipboard sources the history engine can poll
/// Implementations hold no history state of their own; each read is an
/// independent best-effort snapshot of whatever is currently copied
pub trait ClipboardSource: Send + Sync {
    /// Read the current clipboard text
    /// An empty clipboard is `Ok(String::new())`, never an error
    fn read_text(&self) -> Result<String, ClipboardError>;

    /// Get the source name (for logging/debugging)
    fn name(&self) -> &'static str;
}
