//! Configuration file support for the fleet ledger.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fleet/config.toml`.

use crate::ledger::LedgerPaths;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
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

/// Ledger file names, relative to the data directory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_vehicles_file")]
    pub vehicles: String,

    #[serde(default = "default_customers_file")]
    pub customers: String,

    #[serde(default = "default_records_file")]
    pub records: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            vehicles: default_vehicles_file(),
            customers: default_customers_file(),
            records: default_records_file(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("fleet")
}

fn default_vehicles_file() -> String {
    "vehicles.txt".into()
}

fn default_customers_file() -> String {
    "customers.txt".into()
}

fn default_records_file() -> String {
    "rental_records.txt".into()
}

fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| Error::Config("Unable to locate a config directory".into()))?;
        Ok(base.join("fleet").join("config.toml"))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// File names must be plain names so all three files share one directory
    pub fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("vehicles", &self.files.vehicles),
            ("customers", &self.files.customers),
            ("records", &self.files.records),
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(Error::Config(format!(
                    "files.{} must be a plain file name, got {:?}",
                    key, name
                )));
            }
        }
        Ok(())
    }

    /// Ledger file locations inside `data_dir`
    pub fn ledger_paths(&self, data_dir: &Path) -> LedgerPaths {
        LedgerPaths {
            vehicles: data_dir.join(&self.files.vehicles),
            customers: data_dir.join(&self.files.customers),
            records: data_dir.join(&self.files.records),
        }
    }
}
