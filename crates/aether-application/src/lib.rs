//! Application layer for Aether.
//!
//! Use cases coordinating the domain store, persistence and the generative
//! backend: session management, the refinement orchestrator and export.

pub mod clipboard;
pub mod code_kind;
pub mod export;
pub mod orchestrator;
pub mod session_service;

pub use clipboard::{Clipboard, CopyOutcome, SystemClipboard};
pub use code_kind::CodeKind;
pub use orchestrator::{RefinementOrchestrator, SubmissionOutcome};
pub use session_service::SessionService;
