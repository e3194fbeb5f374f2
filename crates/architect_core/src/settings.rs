//! Runtime configuration.
//!
//! [`IlluminationSettings`] is the record handed to the illumination solver.
//! [`PlantArchitectConfig`] bundles it with the remaining knobs and can be
//! loaded from a JSON file:
//!
//! ```json
//! {
//!   "illumination": { "skylight_power": 0.7, "bounce_limit": 3 },
//!   "volume_seed": 42
//! }
//! ```
//!
//! Missing fields fall back to their defaults.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::volume::VolumeRng;

/// Parameters forwarded to the illumination solver.
#[derive(Resource, Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[reflect(Resource, Default)]
#[serde(default)]
pub struct IlluminationSettings {
    /// Sky light power.
    pub skylight_power: f32,
    /// Maximum number of ray bounces.
    pub bounce_limit: u32,
    /// Rays cast per probe.
    pub num_point_samples: u32,
    /// Scatter rays per bounce.
    pub num_scatter_samples: u32,
}

impl Default for IlluminationSettings {
    fn default() -> Self {
        Self {
            skylight_power: 0.7,
            bounce_limit: 3,
            num_point_samples: 100,
            num_scatter_samples: 20,
        }
    }
}

/// Top-level configuration file contents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantArchitectConfig {
    pub illumination: IlluminationSettings,
    /// Seed for volume sampling. Entropy-seeded when absent.
    pub volume_seed: Option<u64>,
}

impl PlantArchitectConfig {
    /// Insert the resources this config describes.
    pub fn apply(&self, app: &mut App) {
        app.insert_resource(self.illumination.clone());
        if let Some(seed) = self.volume_seed {
            app.insert_resource(VolumeRng::from_seed(seed));
        }
    }
}

/// Errors that can occur while reading or writing configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File system error
    Io(std::io::Error),
    /// Malformed JSON
    Json(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load configuration from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<PlantArchitectConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|e| ConfigError::Json(e.to_string()))
}

/// Load configuration, falling back to defaults if the file is missing or invalid.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> PlantArchitectConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            PlantArchitectConfig::default()
        }
        Err(e) => {
            warn!("Ignoring config at {}: {}", path.display(), e);
            PlantArchitectConfig::default()
        }
    }
}

/// Save configuration as pretty-printed JSON.
pub fn save_config<P: AsRef<Path>>(config: &PlantArchitectConfig, path: P) -> ConfigResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, config).map_err(|e| ConfigError::Json(e.to_string()))
}
