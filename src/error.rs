//! Error types.
//!
//! `ScheduleError` covers everything the scheduling core can report about
//! its inputs. None of these are fatal: the top-level operations turn them
//! into excluded-train diagnostics, `Infeasible` schedules, or `false`
//! results on section mutations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recoverable scheduling error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ScheduleError {
    /// Origin and destination have no connecting path.
    #[error("no route from '{origin}' to '{destination}' for train '{train_id}'")]
    UnresolvableRoute {
        train_id: String,
        origin: String,
        destination: String,
    },

    /// The planning horizon cannot hold the minimum span of a train.
    #[error("train '{train_id}' needs the network until minute {required}, horizon is {horizon}")]
    InfeasibleHorizon {
        train_id: String,
        required: i64,
        horizon: i64,
    },

    /// Referenced section is absent from the topology.
    #[error("unknown section '{0}'")]
    UnknownSection(String),

    /// Referenced train is absent from the train set.
    #[error("unknown train '{0}'")]
    UnknownTrain(String),

    /// Reserve/occupy/release rejected by the section state.
    #[error("section '{section_id}' rejected train '{train_id}': {reason}")]
    CapacityViolation {
        section_id: String,
        train_id: String,
        reason: String,
    },

    /// A train ID already used earlier in the same batch.
    #[error("duplicate train id '{train_id}'; only the first occurrence is scheduled")]
    DuplicateTrain { train_id: String },

    /// A route breaks a structural rule (e.g. repeated consecutive section).
    #[error("invalid route for train '{train_id}': {reason}")]
    InvalidRoute { train_id: String, reason: String },
}

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = ScheduleError::UnresolvableRoute {
            train_id: "T1".into(),
            origin: "A".into(),
            destination: "C".into(),
        };
        assert_eq!(e.to_string(), "no route from 'A' to 'C' for train 'T1'");

        let e = ScheduleError::DuplicateTrain { train_id: "T1".into() };
        assert!(e.to_string().starts_with("duplicate train id 'T1'"));

        let e = ScheduleError::UnknownSection("X9".into());
        assert_eq!(e.to_string(), "unknown section 'X9'");
    }

    #[test]
    fn test_config_error_from_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: ConfigError = parse_err.into();
        assert!(matches!(e, ConfigError::Parse(_)));
    }
}
