//! Configuration models.
//!
//! `RootConfig` mirrors `config.toml`; `SecretConfig` mirrors `secret.json`.

use serde::{Deserialize, Serialize};
use version_migrate::DeriveQueryable as Queryable;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq, Queryable)]
#[queryable(entity = "config_root")]
pub struct RootConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub app: AppConfig,
}

/// Generative backend settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API credentials.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Overrides `[backend] model` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}
