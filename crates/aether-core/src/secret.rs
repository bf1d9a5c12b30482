//! Secret management service trait.
//!
//! Defines the interface for loading secret configuration (API keys).

use crate::config::SecretConfig;
use crate::error::Result;

/// Service for loading secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration, applying environment overrides.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}
