//! # Configuration Management Module
//!
//! TOML configuration for the simulation, the environment, storage, autosave
//! and logging. Every section falls back to defaults, so a partial file (or an
//! empty one) loads.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bonsaigotchi::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("bonsai.toml").await?;
//!     let config = Config::load("bonsai.toml").await?;
//!     println!("Save file: {}", config.storage.save_file);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [simulation]
//! time_progression_speed = 1
//! tick_interval_ms = 1000
//! default_name = "Bonsai"
//!
//! [environment]
//! climate_zone = "temperate"
//! time_multiplier = 1.0
//! season_length_days = 30
//! day_bands = "extended"
//!
//! [storage]
//! data_dir = "./data"
//! save_file = "bonsai.json"
//! min_save_interval_ms = 1000
//!
//! [autosave]
//! enabled = true
//! interval_minutes = 5
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::sim::environment::EnvironmentSettings;
use crate::sim::types::{ClimateZone, DayBands};
use crate::storage::autosave::AutosaveConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integer speed multiplier passed to every creature tick.
    pub time_progression_speed: u32,
    pub tick_interval_ms: u64,
    /// Fixed RNG seed for reproducible runs. Entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub default_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_progression_speed: 1,
            tick_interval_ms: 1000,
            seed: None,
            default_name: "Bonsai".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn speed(&self) -> f64 {
        self.time_progression_speed.max(1) as f64
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(10))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// One of: temperate, tropical, desert, alpine.
    pub climate_zone: String,
    pub time_multiplier: f64,
    pub season_length_days: u32,
    /// "extended" (5/10/18/22) or "classic" (6/10/16/20).
    pub day_bands: String,
    pub forecast_days: u32,
    pub max_active_events: usize,
    pub daily_event_chance: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            climate_zone: "temperate".to_string(),
            time_multiplier: 1.0,
            season_length_days: 30,
            day_bands: "extended".to_string(),
            forecast_days: 5,
            max_active_events: 2,
            daily_event_chance: 0.15,
        }
    }
}

impl EnvironmentConfig {
    /// Resolve into engine settings. Unknown names fall back to defaults with a warning.
    pub fn settings(&self) -> EnvironmentSettings {
        let climate_zone = ClimateZone::parse(&self.climate_zone).unwrap_or_else(|| {
            warn!("Unknown climate zone '{}', using temperate", self.climate_zone);
            ClimateZone::Temperate
        });
        let day_bands = DayBands::parse(&self.day_bands).unwrap_or_else(|| {
            warn!("Unknown day banding '{}', using extended", self.day_bands);
            DayBands::EXTENDED
        });
        EnvironmentSettings {
            climate_zone,
            time_multiplier: self.time_multiplier,
            season_length_days: self.season_length_days,
            day_bands,
            forecast_days: self.forecast_days,
            max_active_events: self.max_active_events,
            daily_event_chance: self.daily_event_chance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub save_file: String,
    pub min_save_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            save_file: "bonsai.json".to_string(),
            min_save_interval_ms: 1000,
        }
    }
}

impl StorageConfig {
    pub fn min_save_interval(&self) -> Duration {
        Duration::from_millis(self.min_save_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load if the file exists, otherwise use defaults.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Config::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
