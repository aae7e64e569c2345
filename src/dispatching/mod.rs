//! Dispatching rules: the order in which trains claim section capacity.
//!
//! The greedy scheduler places trains one after another; whoever is placed
//! first gets the earliest free slots. A [`RuleEngine`] composes rules into
//! that order, consulting the next rule only on ties.
//!
//! # Usage
//!
//! ```
//! use u_rail::dispatching::{rules, RuleEngine, TieBreaker};
//! use u_rail::models::{Train, TrainKind, TrainPriority};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::PriorityScore)
//!     .with_rule(rules::EarliestDeparture)
//!     .with_final_tie_breaker(TieBreaker::ById);
//!
//! let trains = vec![
//!     Train::new("slow", TrainKind::Freight),
//!     Train::new("fast", TrainKind::Express).with_priority(TrainPriority::High),
//! ];
//! assert_eq!(engine.sort_indices(&trains), vec![1, 0]);
//! ```

mod engine;
pub mod rules;

pub use engine::{RuleEngine, TieBreaker};

use crate::models::Train;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = dispatched first.
pub type RuleScore = f64;

/// A dispatching rule that ranks trains.
///
/// # Score Convention
/// **Lower score = higher precedence.** Rules return smaller values for
/// trains that should claim capacity first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g. "PRIORITY").
    fn name(&self) -> &'static str;

    /// Evaluates a train.
    fn evaluate(&self, train: &Train) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
