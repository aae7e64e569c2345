//! Optimizer configuration.
//!
//! Every field has a default, so a JSON document only needs to carry the
//! values it overrides:
//!
//! ```
//! use u_rail::config::OptimizerConfig;
//!
//! let config = OptimizerConfig::from_json_str(r#"{ "horizon_min": 720 }"#).unwrap();
//! assert_eq!(config.horizon_min, 720);
//! assert!(config.repair.enabled);
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Train;

/// Default planning horizon: one day, in minutes.
pub const DEFAULT_HORIZON_MIN: i64 = 24 * 60;

/// Default objective constant K in `completion × (K − priority_score)`.
pub const DEFAULT_PRIORITY_CEILING: f64 = 10.0;

/// Scheduling engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Planning horizon (minutes from epoch). Segments must end within it.
    pub horizon_min: i64,
    /// Objective constant K. Must exceed the maximum priority score.
    pub priority_ceiling: f64,
    /// Local-search repair budget.
    pub repair: RepairConfig,
}

/// Budget of the local-search repair pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Whether to run repair after the greedy construction.
    pub enabled: bool,
    /// Maximum number of evaluated moves.
    pub max_iterations: usize,
    /// Optional wall-clock cap (ms). `None` keeps the result a pure
    /// function of the input.
    pub time_limit_ms: Option<u64>,
}

impl OptimizerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the planning horizon.
    pub fn with_horizon(mut self, horizon_min: i64) -> Self {
        self.horizon_min = horizon_min;
        self
    }

    /// Sets the objective constant K.
    pub fn with_priority_ceiling(mut self, ceiling: f64) -> Self {
        self.priority_ceiling = ceiling;
        self
    }

    /// Sets the repair budget.
    pub fn with_repair(mut self, repair: RepairConfig) -> Self {
        self.repair = repair;
        self
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file (JSON) and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_min <= 0 {
            return Err(ConfigError::Invalid(format!(
                "horizon_min must be positive, got {}",
                self.horizon_min
            )));
        }
        if !(self.priority_ceiling > Train::MAX_PRIORITY_SCORE) {
            return Err(ConfigError::Invalid(format!(
                "priority_ceiling must exceed {}, got {}",
                Train::MAX_PRIORITY_SCORE,
                self.priority_ceiling
            )));
        }
        if self.repair.enabled && self.repair.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "repair.max_iterations must be positive when repair is enabled".into(),
            ));
        }
        Ok(())
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            horizon_min: DEFAULT_HORIZON_MIN,
            priority_ceiling: DEFAULT_PRIORITY_CEILING,
            repair: RepairConfig::default(),
        }
    }
}

impl RepairConfig {
    /// Repair switched off: the greedy construction is returned as is.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the wall-clock cap.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Wall-clock cap as a `Duration`.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: 500,
            time_limit_ms: None,
        }
    }
}
