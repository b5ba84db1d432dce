//! Simulation Timing Configuration
//!
//! Every constant is a tick count. The engine assumes one `tick()` per fixed
//! external time unit and never looks at wall-clock time.

use serde::{Serialize, Deserialize};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON could not be parsed.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A tick constant must be positive.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// Timing constants for a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Dwell interval: ticks a beam segment or mirror waits before
    /// re-emitting, and the gravity cadence
    pub laser_time: u32,
    /// Ticks a struck block fades before it is destroyed
    pub fade_time: u32,
    /// Ticks between the win and loading the next level
    pub level_advance_time: u32,
    /// Session ticks before emitters first start firing
    pub emitter_warmup: u32,
    /// Emitters fire every `emitter_period` ticks once warmed up
    pub emitter_period: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            laser_time: 30,
            fade_time: 15,
            level_advance_time: 60,
            emitter_warmup: 30,
            emitter_period: 1,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero-length intervals (gravity and emission cadences divide by them).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.laser_time == 0 {
            return Err(ConfigError::ZeroInterval("laser_time"));
        }
        if self.fade_time == 0 {
            return Err(ConfigError::ZeroInterval("fade_time"));
        }
        if self.emitter_period == 0 {
            return Err(ConfigError::ZeroInterval("emitter_period"));
        }
        Ok(())
    }
}
