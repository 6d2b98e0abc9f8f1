//! Configuration file support for fittrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fittrack/config.toml`.

use crate::calories::ActivityLevel;
use crate::progression::{validate_increment, DEFAULT_PROGRESS_INCREMENT};
use crate::{Error, Gender, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub calories: CaloriesConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
        }
    }
}

/// Calculator defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaloriesConfig {
    #[serde(default = "default_activity")]
    pub default_activity: ActivityLevel,

    #[serde(default = "default_gender")]
    pub default_gender: Gender,
}

impl Default for CaloriesConfig {
    fn default() -> Self {
        Self {
            default_activity: default_activity(),
            default_gender: default_gender(),
        }
    }
}

/// Workout progress configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_increment")]
    pub increment: f32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            increment: default_increment(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("fittrack")
}

fn default_database_file() -> String {
    "fitness.db".into()
}

fn default_activity() -> ActivityLevel {
    ActivityLevel::Active
}

fn default_gender() -> Gender {
    Gender::Female
}

fn default_increment() -> f32 {
    DEFAULT_PROGRESS_INCREMENT
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
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
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("fittrack").join("config.toml")
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        validate_increment(self.progress.increment)
            .map_err(|e| Error::Config(e.to_string()))?;
        if self.data.database_file.trim().is_empty() {
            return Err(Error::Config("database_file must not be empty".into()));
        }
        Ok(())
    }

    /// Database location under `data_dir`
    pub fn database_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.database_file)
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
