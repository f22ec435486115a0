//! Configuration file support for DrinkMate.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/drinkmate/config.toml`.

use crate::similarity::DEFAULT_MATCH_THRESHOLD;
use crate::{BodyProfile, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: BodyProfile,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Drink search configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Optional JSON seed file replacing the built-in catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            catalog_path: None,
        }
    }
}

// Default value functions
fn home_fallback(suffix: &str) -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_else(|| ".".into());
    PathBuf::from(home).join(suffix)
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_fallback(".local/share"));
    base.join("drinkmate")
}

fn default_match_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

impl Config {
    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_fallback(".config"));
        base.join("drinkmate").join("config.toml")
    }

    /// Check values the BAC model and search rely on
    pub fn validate(&self) -> Result<()> {
        if !(self.profile.weight_kg > 0.0) {
            return Err(Error::Config(format!(
                "profile.weight_kg must be positive, got {}",
                self.profile.weight_kg
            )));
        }

        if !(0.0..=1.0).contains(&self.search.match_threshold) {
            return Err(Error::Config(format!(
                "search.match_threshold must be between 0 and 1, got {}",
                self.search.match_threshold
            )));
        }

        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
