//! Live-preview pipeline.
//!
//! - `entry_point`: pluggable component-name extraction
//! - `prepare`: source → render expression transform

mod entry_point;
mod prepare;

pub use entry_point::{EntryPointExtractor, RegexEntryPointExtractor};
pub use prepare::{CodePreparer, EMPTY_RENDER, prepare_code};
