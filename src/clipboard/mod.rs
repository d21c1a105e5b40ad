pub mod memory;
pub mod source;
pub mod system;

use std::sync::Arc;

pub use memory::MemoryClipboard;
pub use source::{ClipboardError, ClipboardSource};
pub use system::SystemClipboard;

/// Create the clipboard source for the current session
/// Falls back to an empty in-memory clipboard when `headless` is requested,
/// which keeps the engine usable on machines with no display server
pub fn create_source(headless: bool) -> Arc<dyn ClipboardSource> {
    if headless {
        log::info!("Using in-memory clipboard (headless)");
        return Arc::new(MemoryClipboard::new());
    }

    log::info!("Using system clipboard");
    Arc::new(SystemClipboard::new())
}
