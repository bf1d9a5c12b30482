//! Configuration service.
//!
//! Loads the root configuration from `config.toml` through version-migrate's
//! `FileStorage`, writing the defaults on first run, and caches it for the
//! lifetime of the service.

use crate::dto::{CONFIG_ROOT_ENTITY, create_config_root_migrator};
use crate::paths::AetherPaths;
use aether_core::config::RootConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &AetherPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| anyhow::anyhow!("Failed to get config path: {}", e))?;
        Ok(Self {
            path,
            config: Arc::new(RwLock::new(None)),
        })
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// An unreadable file falls back to the defaults (logged), so a broken
    /// config never prevents startup.
    pub fn get_config(&self) -> RootConfig {
        if let Ok(guard) = self.config.read() {
            if let Some(cached) = guard.as_ref() {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {:#}", e);
            RootConfig::default()
        });

        if let Ok(mut guard) = self.config.write() {
            *guard = Some(loaded.clone());
        }
        loaded
    }

    fn open_storage(&self) -> Result<FileStorage> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);

        FileStorage::new(self.path.clone(), create_config_root_migrator(), strategy)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", self.path.display(), e))
    }

    fn load_config(&self) -> Result<RootConfig> {
        let mut storage = self.open_storage()?;

        let configs: Vec<RootConfig> = storage
            .query(CONFIG_ROOT_ENTITY)
            .map_err(|e| anyhow::anyhow!("Failed to query config_root: {}", e))?;

        match configs.into_iter().next() {
            Some(config) => Ok(config),
            None => {
                let defaults = RootConfig::default();
                storage
                    .update_and_save(CONFIG_ROOT_ENTITY, vec![defaults.clone()])
                    .map_err(|e| anyhow::anyhow!("Failed to save default config: {}", e))?;
                tracing::info!("Wrote default configuration to {}", self.path.display());
                Ok(defaults)
            }
        }
    }
}
