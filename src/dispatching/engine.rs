//! Rule engine for multi-criteria dispatching.
//!
//! Rules are applied in sequence; the next rule is consulted only when the
//! previous one ties (within `epsilon`). A final tie-breaker makes the
//! order total.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, DispatchingRule, RuleScore};
use crate::models::Train;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Deterministic by train ID (lexicographic).
    ById,
}

/// A composable rule engine for train ordering.
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Priority score, then earliest departure, then train ID.
    pub fn railway_default() -> Self {
        Self::new()
            .with_rule(rules::PriorityScore)
            .with_rule(rules::EarliestDeparture)
            .with_final_tie_breaker(TieBreaker::ById)
    }

    /// Appends a rule. Earlier rules dominate later ones.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Score difference below which two trains tie on a rule.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Sorts trains (first to dispatch first).
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices<T: Borrow<Train>>(&self, trains: &[T]) -> Vec<usize> {
        let scores: Vec<Vec<RuleScore>> = trains.iter().map(|t| self.evaluate(t.borrow())).collect();
        let mut indices: Vec<usize> = (0..trains.len()).collect();
        indices.sort_by(|&a, &b| {
            self.compare_scored(trains[a].borrow(), &scores[a], trains[b].borrow(), &scores[b])
        });
        indices
    }

    /// Returns the index of the train to dispatch first.
    pub fn select_best<T: Borrow<Train>>(&self, trains: &[T]) -> Option<usize> {
        self.sort_indices(trains).first().copied()
    }

    /// Evaluates a single train under every rule.
    pub fn evaluate(&self, train: &Train) -> Vec<RuleScore> {
        self.rules.iter().map(|r| r.evaluate(train)).collect()
    }

    /// Compares two trains.
    pub fn compare(&self, a: &Train, b: &Train) -> Ordering {
        self.compare_scored(a, &self.evaluate(a), b, &self.evaluate(b))
    }

    fn compare_scored(&self, a: &Train, sa: &[RuleScore], b: &Train, sb: &[RuleScore]) -> Ordering {
        for (score_a, score_b) in sa.iter().zip(sb) {
            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(score_b).unwrap_or(Ordering::Equal);
            }
        }

        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::railway_default()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
