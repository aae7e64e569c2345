//! Conflict and resolution records.

use serde::{Deserialize, Serialize};

/// How a conflict was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// More trains route over a section than it can hold (declared usage).
    CapacityExceeded,
    /// Scheduled segments overlap beyond the section capacity.
    ScheduledOverlap,
}

/// A capacity violation among trains sharing a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Stable identifier: `CONF_{train_a}_{train_b}_{section}`.
    pub id: String,
    /// Trains involved (unordered pair, listed once).
    pub train_ids: Vec<String>,
    /// Contended section.
    pub section_id: String,
    pub kind: ConflictKind,
    /// Start of the contended span (min).
    pub start_min: i64,
    /// End of the contended span (min).
    pub end_min: i64,
    /// Severity on a 1–5 scale.
    pub severity: u8,
    pub resolved: bool,
}

impl Conflict {
    /// Severity of structural (declared-usage) conflicts.
    pub const STRUCTURAL_SEVERITY: u8 = 3;
    /// Severity of overlaps found in a committed schedule.
    pub const SCHEDULED_SEVERITY: u8 = 4;

    /// Creates an unresolved pairwise conflict.
    pub fn pair(
        kind: ConflictKind,
        train_a: &str,
        train_b: &str,
        section_id: &str,
        start_min: i64,
        end_min: i64,
    ) -> Self {
        let severity = match kind {
            ConflictKind::CapacityExceeded => Self::STRUCTURAL_SEVERITY,
            ConflictKind::ScheduledOverlap => Self::SCHEDULED_SEVERITY,
        };
        Self {
            id: format!("CONF_{train_a}_{train_b}_{section_id}"),
            train_ids: vec![train_a.to_string(), train_b.to_string()],
            section_id: section_id.to_string(),
            kind,
            start_min,
            end_min,
            severity,
            resolved: false,
        }
    }

    /// Whether a train takes part in this conflict.
    pub fn involves(&self, train_id: &str) -> bool {
        self.train_ids.iter().any(|t| t == train_id)
    }
}

/// Corrective action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Hold the lower-priority train until the section clears.
    PriorityDelay,
}

/// A recommended action for one conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub conflict_id: String,
    pub strategy: ResolutionStrategy,
    /// Train to hold.
    pub delayed_train: String,
    /// Train that proceeds.
    pub priority_train: String,
    /// Hold time (min).
    pub delay_min: i64,
    /// 0.0..1.0.
    pub confidence: f64,
    /// Human-readable action.
    pub action: String,
}
