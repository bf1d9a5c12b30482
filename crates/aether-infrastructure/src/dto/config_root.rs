//! ConfigRoot DTOs and migrator.

use aether_core::config::{AppConfig, BackendConfig, RootConfig};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

/// Entity name `config.toml` stores its root under.
pub const CONFIG_ROOT_ENTITY: &str = "config_root";

/// Root configuration schema V1.0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConfigRootV1_0_0 {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub app: AppConfig,
}

impl IntoDomain<RootConfig> for ConfigRootV1_0_0 {
    fn into_domain(self) -> RootConfig {
        RootConfig {
            backend: self.backend,
            app: self.app,
        }
    }
}

impl version_migrate::FromDomain<RootConfig> for ConfigRootV1_0_0 {
    fn from_domain(config: RootConfig) -> Self {
        ConfigRootV1_0_0 {
            backend: config.backend,
            app: config.app,
        }
    }
}

/// Creates a migrator for the root configuration.
pub fn create_config_root_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define(CONFIG_ROOT_ENTITY)
        .from::<ConfigRootV1_0_0>()
        .into_with_save::<RootConfig>();

    migrator
        .register(config_path)
        .expect("Failed to create config_root migrator");

    migrator
}
