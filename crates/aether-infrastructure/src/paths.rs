//! Unified path management for aether files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/aether/              # Config directory
//! ├── config.toml                # Application configuration
//! ├── secret.json                # API keys
//! └── logs/                      # Application logs
//!     └── aether.log.YYYY-MM-DD
//!
//! ~/.local/share/aether/         # Data directory
//! ├── aether-sessions.json       # Persisted sessions
//! └── aether-active-session.json # Active session id
//! ```
//!
//! With a base path every directory collapses into that base, which is how
//! tests and `--data-dir` keep everything in one place.

use aether_core::config::{GeminiConfig, SecretConfig};
use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

const APP_DIR: &str = "aether";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every file location the application uses.
#[derive(Debug, Clone, Default)]
pub struct AetherPaths {
    base: Option<PathBuf>,
}

impl AetherPaths {
    /// Creates a resolver; `None` uses the platform directories.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Platform directories (XDG on Linux/macOS) for the app.
    fn app_paths() -> AppPaths {
        AppPaths::new(APP_DIR)
    }

    /// Returns the configuration directory (e.g., `~/.config/aether/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (e.g., `~/.local/share/aether/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .data_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating a template if it doesn't.
    ///
    /// The template is written with 600 permissions on Unix.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: None,
            }),
        };
        let template_json = serde_json::to_string_pretty(&template).map_err(std::io::Error::other)?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_platform_dirs_end_with_app_name() {
        let paths = AetherPaths::default();
        if let Ok(config_dir) = paths.config_dir() {
            assert!(config_dir.ends_with(APP_DIR));
        }
        if let Ok(data_dir) = paths.data_dir() {
            assert!(data_dir.ends_with(APP_DIR));
        }
    }

    #[test]
    fn test_base_override() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AetherPaths::new(Some(temp_dir.path()));
        assert_eq!(paths.data_dir().unwrap(), temp_dir.path());
        assert_eq!(
            paths.config_file().unwrap(),
            temp_dir.path().join("config.toml")
        );
        assert!(paths.logs_dir().unwrap().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AetherPaths::new(Some(temp_dir.path()));

        let path = paths.ensure_secret_file().unwrap();
        let template: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(template.gemini.unwrap().api_key, "");

        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));
    }
}
