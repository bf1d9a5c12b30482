//! Session domain module.
//!
//! This module contains the session domain model, its undo/redo timeline,
//! the in-memory store and the persistence interface.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `CodeVersion`) and constants
//! - `message`: Chat message types (`MessageRole`, `Message`)
//! - `history`: Versioning operations (commit, undo, redo)
//! - `store`: Session collection with one active session (`SessionStore`)
//! - `repository`: Repository trait for snapshot persistence
//!
//! # Usage
//!
//! ```ignore
//! use aether_core::session::{Session, SessionStore, SessionSnapshotRepository};
//! use aether_core::session::{Message, MessageRole};
//! ```

mod history;
mod message;
mod model;
mod repository;
mod store;

// Re-export public API
pub use message::{Message, MessageRole};
pub use model::{
    CodeVersion, HISTORY_CAP, NAME_PREFIX_CHARS, PLACEHOLDER_CSS, PLACEHOLDER_JSX,
    PLACEHOLDER_MARKER, SESSION_STARTED_MESSAGE, Session, name_from_prompt,
};
pub use repository::{SessionSnapshot, SessionSnapshotRepository};
pub use store::SessionStore;
