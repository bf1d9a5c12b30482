//! Secret service implementation.
//!
//! Reads API keys from `secret.json`. The `GEMINI_API_KEY` and
//! `GOOGLE_API_KEY` environment variables take precedence over the file.

use crate::paths::AetherPaths;
use aether_core::config::{GeminiConfig, SecretConfig};
use aether_core::error::{AetherError, Result};
use aether_core::secret::SecretService;
use std::path::PathBuf;

/// Environment variables consulted for the Gemini key, in priority order.
pub const GEMINI_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
}

impl SecretServiceImpl {
    pub fn new(paths: &AetherPaths) -> anyhow::Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| anyhow::anyhow!("Failed to get secret path: {}", e))?;
        Ok(Self { path })
    }

    /// A missing or blank file means no secrets.
    fn load_file(&self) -> Result<SecretConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SecretConfig::default()),
            Err(e) => {
                return Err(AetherError::io(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        // never include file contents: they hold the key
        serde_json::from_str(&content)
            .map_err(|_| AetherError::config(format!("Failed to parse {}", self.path.display())))
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(
    mut config: SecretConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SecretConfig {
    let from_env = GEMINI_KEY_ENV_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));

    if let Some(api_key) = from_env {
        match config.gemini.as_mut() {
            Some(gemini) => gemini.api_key = api_key,
            None => {
                config.gemini = Some(GeminiConfig {
                    api_key,
                    model_name: None,
                })
            }
        }
    }
    config
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        let from_file = self.load_file()?;
        Ok(apply_env_overrides(from_file, |name| std::env::var(name).ok()))
    }

    async fn secret_file_exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(key: &str) -> SecretConfig {
        SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: key.to_string(),
                model_name: Some("gemini-pro".to_string()),
            }),
        }
    }

    #[test]
    fn test_env_overrides_file_key() {
        let config = apply_env_overrides(config_with("file"), |name| {
            (name == "GOOGLE_API_KEY").then(|| "env".to_string())
        });
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "env");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-pro"));
    }

    #[test]
    fn test_gemini_var_wins_over_google_var() {
        let config = apply_env_overrides(SecretConfig::default(), |name| match name {
            "GEMINI_API_KEY" => Some("gemini".to_string()),
            "GOOGLE_API_KEY" => Some("google".to_string()),
            _ => None,
        });
        assert_eq!(config.gemini.unwrap().api_key, "gemini");
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = apply_env_overrides(config_with("file"), |_| Some("  ".to_string()));
        assert_eq!(config.gemini.unwrap().api_key, "file");
    }

    #[tokio::test]
    async fn test_reads_secret_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AetherPaths::new(Some(temp_dir.path()));
        let service = SecretServiceImpl::new(&paths).unwrap();
        assert!(!service.secret_file_exists().await);

        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini":{"api_key":"from-file"}}"#,
        )
        .unwrap();
        assert!(service.secret_file_exists().await);
        let secrets = service.load_file().unwrap();
        assert_eq!(secrets.gemini.unwrap().api_key, "from-file");
    }

    #[test]
    fn test_blank_file_means_no_secrets() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("secret.json"), " \n").unwrap();
        let service = SecretServiceImpl::new(&AetherPaths::new(Some(temp_dir.path()))).unwrap();
        assert!(service.load_file().unwrap().gemini.is_none());
    }

    #[test]
    fn test_parse_error_hides_contents() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("secret.json"), "{\"gemini\": sk-live").unwrap();
        let service = SecretServiceImpl::new(&AetherPaths::new(Some(temp_dir.path()))).unwrap();
        let err = service.load_file().unwrap_err();
        assert!(!err.to_string().contains("sk-live"));
    }
}
