//! Demo configuration, loaded from an optional JSON file.
//!
//! Every field has a default, so a config file only needs the fields it
//! changes:
//!
//! ```json
//! { "ticks": 1200, "particles_per_burst": 500 }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Number of ticks to simulate.
    pub ticks: u32,
    /// Seconds per tick.
    pub delta_time: f32,
    /// Ticks between particle bursts.
    pub spawn_every: u32,
    pub particles_per_burst: u32,
    /// Seconds a particle lives.
    pub particle_lifetime: f32,
    /// Radius of the ring particles spawn on, around the attractor.
    pub spawn_radius: f32,
    /// Point particles drift towards.
    pub attractor: Vec2,
    /// Ticks between stats reports; 0 disables them.
    pub report_every: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            delta_time: 1.0 / 60.0,
            spawn_every: 60,
            particles_per_burst: 300,
            particle_lifetime: 4.0,
            spawn_radius: 300.0,
            attractor: Vec2::new(400.0, 225.0),
            report_every: 60,
        }
    }
}

impl DemoConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The config at `path`, or the defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
