//! Construction and runner parameters
//!
//! Loaded from a JSON file; any missing field keeps its default, and the
//! runner falls back to defaults entirely when the file is missing or corrupt.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::WallLayout;
use crate::tuning::Tuning;

/// Errors from loading or validating a configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O failed: {e}"),
            ConfigError::Parse(e) => write!(f, "Config parse failed: {e}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Box extent along X
    pub width: f32,
    /// Box extent along Z
    pub height: f32,
    /// Initial population, split across groups; the first
    /// `particle_count % groups` groups take one extra
    #[serde(alias = "particleCount")]
    pub particle_count: usize,
    pub groups: usize,
    pub gravity: Vec3,
    /// Per-tick velocity multiplier
    pub damping: f32,
    pub seed: u64,
    pub wall_layout: WallLayout,
    pub wall_height: f32,

    // === Runner ===
    /// Fixed step used by the native runner
    pub sim_dt: f32,
    pub max_substeps: u32,
    /// Seconds between random spawns; `None` disables spawning
    pub spawn_interval: Option<f32>,
    pub max_particles: usize,

    pub tuning: Tuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            particle_count: 200,
            groups: 4,
            gravity: Vec3::new(0.0, -3.0, 0.0),
            damping: 0.985,
            seed: 42,
            wall_layout: WallLayout::Open,
            wall_height: 30.0,

            sim_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            spawn_interval: None,
            max_particles: 800,

            tuning: Tuning::default(),
        }
    }
}

impl SimConfig {
    /// Particles emitted by seed group `group`; zero groups means no population
    pub fn group_size(&self, group: usize) -> usize {
        crate::sim::shapes::group_size(group, self.groups, self.particle_count)
    }

    /// Read and validate a JSON config
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Like [`SimConfig::load`], but any failure yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    /// Write pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("wall_height", self.wall_height),
            ("sim_dt", self.sim_dt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::Invalid(format!("damping must be in [0, 1], got {}", self.damping)));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".into()));
        }
        match self.spawn_interval {
            Some(interval) if !(interval.is_finite() && interval > 0.0) => {
                return Err(ConfigError::Invalid(format!("spawn_interval must be positive, got {interval}")));
            }
            _ => {}
        }
        self.tuning.check().map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("liquid_flock_{}_{name}.json", std::process::id()))
    }

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.group_size(0), 50);
        assert_eq!(config.wall_layout.wall_count(), 4);
    }

    #[test]
    fn test_group_size_with_no_groups() {
        let config = SimConfig {
            groups: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.group_size(0), 0);
    }

    #[test]
    fn test_group_sizes_cover_whole_population() {
        for (particle_count, groups) in [(10, 4), (3, 4), (200, 4), (7, 1), (0, 3)] {
            let config = SimConfig {
                particle_count,
                groups,
                ..SimConfig::default()
            };
            let sizes: Vec<usize> = (0..groups).map(|g| config.group_size(g)).collect();
            assert_eq!(sizes.iter().sum::<usize>(), particle_count);
            let (lo, hi) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
            assert!(hi - lo <= 1);
        }
        let config = SimConfig {
            particle_count: 10,
            groups: 4,
            ..SimConfig::default()
        };
        assert_eq!((0..4).map(|g| config.group_size(g)).collect::<Vec<_>>(), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "width": 60, "particleCount": 80, "gravity": [0, -9.8, 0] }"#).unwrap();
        assert_eq!(config.width, 60.0);
        assert_eq!(config.particle_count, 80);
        assert_eq!(config.gravity, Vec3::new(0.0, -9.8, 0.0));
        assert_eq!(config.height, 100.0);
        assert_eq!(config.damping, 0.985);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let path = temp_path("roundtrip");
        let config = SimConfig {
            seed: 7,
            wall_layout: WallLayout::Enclosed,
            spawn_interval: Some(0.5),
            ..SimConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = SimConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::load(temp_path("does_not_exist")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SimConfig::load(&path), Err(ConfigError::Parse(_))));
        assert_eq!(SimConfig::load_or_default(&path), SimConfig::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            SimConfig { width: 0.0, ..SimConfig::default() },
            SimConfig { damping: 1.5, ..SimConfig::default() },
            SimConfig { max_substeps: 0, ..SimConfig::default() },
            SimConfig { spawn_interval: Some(-1.0), ..SimConfig::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        let mut config = SimConfig::default();
        config.tuning.particle.mass_range = (0.0, 1.0);
        assert!(config.validate().is_err());
    }
}
