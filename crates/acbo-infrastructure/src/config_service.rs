//! Configuration service implementation.
//!
//! Loads `AcboConfig` from `~/.config/acbo/config.toml` (or an explicit path)
//! and caches it. A missing file means defaults.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use acbo_core::config::AcboConfig;
use acbo_core::error::{AcboError, Result};

use crate::paths::AcboPaths;

/// Loads and caches the configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// `None` means the default location.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<AcboConfig>>>,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Resolved config file path.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => AcboPaths::config_file(),
        }
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed or validated.
    /// A missing file is not an error.
    pub fn get_config(&self) -> Result<AcboConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load_from(&self.config_path()?)?;

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    /// Reads and validates a config file. Returns defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<AcboConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
            return Ok(AcboConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AcboConfig = toml::from_str(&content)?;
        config.validate()?;

        tracing::debug!("[ConfigService] Loaded {}", path.display());
        Ok(config)
    }

    /// Writes `config` to the config file, creating parent directories, and
    /// refreshes the cache.
    pub fn save(&self, config: &AcboConfig) -> Result<PathBuf> {
        config.validate()?;
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(config)?)?;

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(config.clone());
        Ok(path)
    }

    /// Renders the effective configuration as TOML.
    pub fn render(config: &AcboConfig) -> Result<String> {
        toml::to_string_pretty(config).map_err(AcboError::from)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
