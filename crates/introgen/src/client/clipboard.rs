use crate::prelude::*;
use introgen_core::session::FormSession;

/// Destination for the Copy action
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The operating system clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| eyre!("Failed to open clipboard: {}", e))?;
            self.inner = Some(clipboard);
        }
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| eyre!("Clipboard unavailable"))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| eyre!("Failed to write to clipboard: {}", e))
    }
}

/// Copy the session's current introduction, if any.
///
/// Returns `false` without touching the clipboard when there is nothing to copy.
pub fn copy_result(session: &FormSession, sink: &mut impl ClipboardSink) -> Result<bool> {
    match session.copy_text() {
        Some(text) => {
            sink.set_text(text)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
