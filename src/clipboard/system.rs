use arboard::Clipboard;

use super::source::{ClipboardError, ClipboardSource};

/// System clipboard source backed by arboard
///
/// A fresh `Clipboard` handle is opened for every read. Handles are not
/// `Sync` on every platform, and reopening keeps the source stateless so the
/// monitor thread can own it through an `Arc`.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Create a new system clipboard source
    pub fn new() -> Self {
        SystemClipboard
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut clipboard = Clipboard::new().map_err(map_open_error)?;

        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Nothing copied, or nothing in a text format: treat as empty
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(arboard::Error::ConversionFailure) => Err(ClipboardError::NonText(
                "clipboard data could not be converted to UTF-8 text".to_string(),
            )),
            Err(e) => Err(ClipboardError::Access(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

fn map_open_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("clipboard not supported on this platform".to_string())
        }
        other => ClipboardError::Unavailable(other.to_string()),
    }
}
