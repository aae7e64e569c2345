//! Built-in dispatching rules.
//!
//! # Score Convention
//! All rules return lower scores for trains that should go first.

use super::{DispatchingRule, RuleScore};
use crate::models::Train;

/// Derived priority score, highest first.
///
/// Uses [`Train::priority_score`]: base priority × kind multiplier plus
/// the capped delay penalty.
#[derive(Debug, Clone, Copy)]
pub struct PriorityScore;

impl DispatchingRule for PriorityScore {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, train: &Train) -> RuleScore {
        -train.priority_score()
    }

    fn description(&self) -> &'static str {
        "Derived Priority Score"
    }
}

/// Earliest scheduled departure first.
#[derive(Debug, Clone, Copy)]
pub struct EarliestDeparture;

impl DispatchingRule for EarliestDeparture {
    fn name(&self) -> &'static str {
        "EDEP"
    }

    fn evaluate(&self, train: &Train) -> RuleScore {
        train.scheduled_departure_min as f64
    }

    fn description(&self) -> &'static str {
        "Earliest Scheduled Departure"
    }
}

/// Earliest scheduled arrival first (due-date analogue).
#[derive(Debug, Clone, Copy)]
pub struct EarliestArrival;

impl DispatchingRule for EarliestArrival {
    fn name(&self) -> &'static str {
        "EARR"
    }

    fn evaluate(&self, train: &Train) -> RuleScore {
        train.scheduled_arrival_min as f64
    }

    fn description(&self) -> &'static str {
        "Earliest Scheduled Arrival"
    }
}
