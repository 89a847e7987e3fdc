//! System clipboard through arboard.

use qrscan_core::{Clipboard, ClipboardError, MemoryClipboard};

/// Owns the arboard handle for the whole session; on X11 and Wayland the
/// copied text disappears when the handle is dropped.
pub struct ArboardClipboard {
    inner: arboard::Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

impl Clipboard for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// The system clipboard, or a process-local one when none is reachable
/// (headless sessions, SSH).
pub fn system_clipboard() -> Box<dyn Clipboard> {
    match ArboardClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(e) => {
            tracing::warn!("{}, copies stay inside qrscan", e);
            Box::new(MemoryClipboard::new())
        }
    }
}
