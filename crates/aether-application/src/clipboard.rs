//! System clipboard access.

/// Destination of the copy action.
pub trait Clipboard: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> Result<(), String>;
}

/// The desktop clipboard via `arboard`.
///
/// Fails on headless hosts (no display server), which callers report to
/// the user instead of claiming success.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
        clipboard.set_text(text).map_err(|e| e.to_string())
    }
}

/// Result of copying a source of the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The code is on the clipboard.
    Copied,
    /// The clipboard could not be written; the code is returned for display.
    Unavailable(String),
}
