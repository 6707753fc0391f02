//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document on disk.
//!
//! - Partial documents are fine: every struct is `#[serde(default)]`, so
//!   only the overridden fields need to be present.
//! - Values are validated after loading and before saving.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::AppConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FEEDER_CONFIG";
/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "feeder.json";

pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$FEEDER_CONFIG`, or `feeder.json` in the working directory.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, falling back to defaults when no file exists.  Any other
    /// failure is returned.
    pub fn load_or_default(&self) -> Result<AppConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                warn!("No config at {}, using defaults", self.path.display());
                Ok(AppConfig::default())
            }
            other => other,
        }
    }
}

impl ConfigPort for JsonConfigStore {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => {
                warn!("Config read {} failed: {}", self.path.display(), e);
                ConfigError::IoError
            }
        })?;
        let config: AppConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config {} unparseable: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        std::fs::write(&self.path, text).map_err(|e| {
            warn!("Config write {} failed: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("Config saved to {}", self.path.display());
        Ok(())
    }
}
