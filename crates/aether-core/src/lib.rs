pub mod config;
pub mod error;
pub mod flow;
pub mod notification;
pub mod preview;
pub mod secret;
pub mod selection;
pub mod session;

// Re-export common error type
pub use error::{AetherError, Result};
