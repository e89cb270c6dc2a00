//! Configuration file support for the kennel tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/kennel/config.toml`.

use crate::types::AgeGroupTable;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub age_groups: AgeGroupsConfig,
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

/// Upcoming-events schedule configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
        }
    }
}

/// Puppy age-group table override
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AgeGroupsConfig {
    /// TOML file replacing the built-in table
    #[serde(default)]
    pub table_path: Option<PathBuf>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kennel")
}

fn default_horizon_days() -> u32 {
    30
}

/// Longest schedule look-ahead accepted from config
pub const MAX_HORIZON_DAYS: u32 = 3650;

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    ///
    /// A relative age-group table path is taken relative to the config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        if let (Some(table_path), Some(base)) = (&config.age_groups.table_path, path.parent()) {
            if table_path.is_relative() {
                config.age_groups.table_path = Some(base.join(table_path));
            }
        }

        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check values serde cannot constrain
    pub fn validate(&self) -> Result<()> {
        let horizon = self.schedule.horizon_days;
        if horizon == 0 || horizon > MAX_HORIZON_DAYS {
            return Err(Error::Config(format!(
                "schedule.horizon_days must be between 1 and {}, got {}",
                MAX_HORIZON_DAYS, horizon
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kennel")
            .join("config.toml")
    }

    /// The age-group table to use: the configured file, or the built-in default
    ///
    /// A configured table that fails validation is an error rather than a
    /// silent fallback to the default.
    pub fn age_group_table(&self) -> Result<AgeGroupTable> {
        match &self.age_groups.table_path {
            Some(path) => AgeGroupTable::load_from(path),
            None => {
                let table = crate::age_groups::default_age_groups().clone();
                table.ensure_valid()?;
                Ok(table)
            }
        }
    }
}
