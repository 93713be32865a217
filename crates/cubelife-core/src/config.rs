//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Dimensions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Board generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Cells along the X axis (values below 1 are clamped to 1)
    pub size_x: i32,
    /// Cells along the Y axis
    pub size_y: i32,
    /// Cells along the Z axis
    pub size_z: i32,
    /// Chance that each cell starts alive (0.0 to 1.0)
    pub spawn_probability: f32,
    /// Random seed for reproducibility; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl BoardConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::clamped(self.size_x, self.size_y, self.size_z)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size_x: 10,
            size_y: 10,
            size_z: 10,
            spawn_probability: 0.3,
            seed: None,
        }
    }
}

/// Tick playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Number of ticks to run
    pub tick_count: u32,
    /// Delay between ticks, in seconds
    pub tick_duration_secs: f32,
}

impl PlaybackConfig {
    /// Check the delay is usable and convert it.
    pub fn tick_duration(&self) -> Result<Duration> {
        let secs = self.tick_duration_secs;
        if !secs.is_finite() || secs <= 0.0 {
            return Err(Error::Validation(format!(
                "tick duration must be a positive number of seconds, got {}",
                secs
            )));
        }
        Ok(Duration::from_secs_f32(secs))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_count: 20,
            tick_duration_secs: 0.5,
        }
    }
}

/// Complete configuration for a headless run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub board: BoardConfig,
    pub playback: PlaybackConfig,
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.playback.tick_duration()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let playback = PlaybackConfig::default();
        assert_eq!(playback.tick_count, 20);
        assert_eq!(playback.tick_duration().unwrap(), Duration::from_millis(500));

        let board = BoardConfig::default();
        assert_eq!(board.dimensions().cell_count(), 1000);
        assert!(board.seed.is_none());
    }

    #[test]
    fn test_tick_duration_validation() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = PlaybackConfig {
                tick_duration_secs: bad,
                ..Default::default()
            };
            assert!(matches!(config.tick_duration(), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{ "board": { "size_x": 3, "seed": 7 }, "playback": { "tick_count": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.board.size_x, 3);
        assert_eq!(config.board.size_y, 10);
        assert_eq!(config.board.seed, Some(7));
        assert_eq!(config.playback.tick_count, 5);
        assert_eq!(config.playback.tick_duration_secs, 0.5);
    }

    #[test]
    fn test_json_rejects_bad_duration() {
        let result =
            SimulationConfig::from_json_str(r#"{ "playback": { "tick_duration_secs": 0.0 } }"#);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::from_json_file("/nonexistent/cubelife.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
