//! Live-preview code preparation.
//!
//! Turns raw component source into an expression the live-rendering library
//! can evaluate. The transform is pure and best-effort: it never fails, and
//! source it cannot understand is wrapped in a container element.

use super::entry_point::{EntryPointExtractor, RegexEntryPointExtractor};
use crate::session::{PLACEHOLDER_JSX, PLACEHOLDER_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;

/// Render expression used for an empty source.
pub const EMPTY_RENDER: &str = "render(null)";

static RENDER_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\brender\s*\(").expect("valid regex"));

static DEFAULT_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export default\s+").expect("valid regex"));

/// Preview pipeline parameterized by its entry-point strategy.
pub struct CodePreparer {
    extractor: Box<dyn EntryPointExtractor>,
}

impl CodePreparer {
    pub fn new(extractor: Box<dyn EntryPointExtractor>) -> Self {
        Self { extractor }
    }

    /// Prepares `source` for rendering.
    ///
    /// Running this on its own output returns that output unchanged.
    pub fn prepare(&self, source: &str) -> String {
        if source.is_empty() {
            return EMPTY_RENDER.to_string();
        }
        if source.contains(PLACEHOLDER_MARKER) {
            return placeholder_render();
        }
        if RENDER_CALL.is_match(source) {
            return source.to_string();
        }

        let without_export = DEFAULT_EXPORT.replace(source, "");
        let without_export: &str = without_export.as_ref();
        let cleaned = without_export.strip_suffix(';').unwrap_or(without_export);

        match self.extractor.extract(cleaned) {
            Some(name) => format!("{cleaned}\n\nrender(<{name} />);"),
            None => {
                tracing::debug!("No entry point found, wrapping source in a container");
                format!("render(<div>{cleaned}</div>)")
            }
        }
    }
}

impl Default for CodePreparer {
    fn default() -> Self {
        Self::new(Box::new(RegexEntryPointExtractor))
    }
}

impl std::fmt::Debug for CodePreparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodePreparer").finish_non_exhaustive()
    }
}

/// Prepares `source` with the default regex strategy.
pub fn prepare_code(source: &str) -> String {
    CodePreparer::default().prepare(source)
}

fn placeholder_render() -> String {
    format!("render({PLACEHOLDER_JSX})")
}
