//! Real-time re-optimization.
//!
//! Applies disruption batches to the train set, re-runs the scheduling
//! engine over the full set, and reports what changed versus the
//! previously retained schedule.
//!
//! # Algorithm
//!
//! 1. `Delay` shifts the named train's scheduled departure and arrival.
//!    Unknown trains are ignored.
//! 2. `Blockage` adds a section block. Blocks are retained across updates
//!    until [`RealTimeOptimizer::clear_blocks`].
//! 3. Full re-solve (not incremental).
//! 4. Impact: trains whose segment lists differ, and whether the average
//!    delay strictly improved.
//! 5. The new schedule replaces the retained one, even when worse.

use std::collections::BTreeSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::models::{Disruption, Network, Schedule, SectionBlock, Train};
use crate::scheduler::{CancellationToken, OptimizationRequest, SchedulingEngine};

/// Delta between two consecutive schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleImpact {
    /// Number of trains whose segments changed (added and removed included).
    pub changes: usize,
    /// IDs of those trains, sorted.
    pub affected_trains: Vec<String>,
    /// New average delay strictly below the previous one.
    pub improved: bool,
}

/// Result of one update.
#[derive(Debug, Clone)]
pub struct ReoptimizationOutcome {
    /// The new schedule (possibly infeasible).
    pub schedule: Schedule,
    /// Delta versus the previous schedule.
    pub impact: ScheduleImpact,
    /// The train set after disruptions, for the caller to commit.
    pub trains: Vec<Train>,
}

/// Holds the last schedule and re-optimizes on disruptions.
#[derive(Debug, Clone)]
pub struct RealTimeOptimizer {
    engine: SchedulingEngine,
    current: Option<Schedule>,
    blocks: Vec<SectionBlock>,
    last_update: Option<SystemTime>,
}

impl RealTimeOptimizer {
    /// Creates an optimizer with no retained schedule.
    pub fn new(engine: SchedulingEngine) -> Self {
        Self {
            engine,
            current: None,
            blocks: Vec::new(),
            last_update: None,
        }
    }

    /// The retained schedule, if any.
    pub fn current_schedule(&self) -> Option<&Schedule> {
        self.current.as_ref()
    }

    /// Section blocks currently in force.
    pub fn blocks(&self) -> &[SectionBlock] {
        &self.blocks
    }

    /// Drops all retained section blocks.
    pub fn clear_blocks(&mut self) {
        self.blocks.clear();
    }

    /// Time of the last update.
    pub fn last_update(&self) -> Option<SystemTime> {
        self.last_update
    }

    /// Applies `disruptions`, re-solves and computes the impact.
    pub fn update(
        &mut self,
        network: &Network,
        trains: &[Train],
        disruptions: &[Disruption],
        cancel: Option<CancellationToken>,
    ) -> ReoptimizationOutcome {
        let mut trains = trains.to_vec();
        for disruption in disruptions {
            self.apply(&mut trains, disruption);
        }

        let mut request =
            OptimizationRequest::new(trains).with_blocks(self.blocks.iter().cloned());
        if let Some(token) = cancel {
            request = request.with_cancellation(token);
        }
        let schedule = self.engine.solve(network, &request);

        let impact = match &self.current {
            Some(previous) => impact_between(previous, &schedule),
            None => ScheduleImpact::default(),
        };
        log::info!(
            "re-optimized after {} disruption(s): {} train(s) changed, improved={}",
            disruptions.len(),
            impact.changes,
            impact.improved
        );

        self.current = Some(schedule.clone());
        self.last_update = Some(SystemTime::now());

        ReoptimizationOutcome {
            schedule,
            impact,
            trains: request.trains,
        }
    }

    fn apply(&mut self, trains: &mut [Train], disruption: &Disruption) {
        match disruption {
            Disruption::Delay { train_id, delay_min } => {
                match trains.iter_mut().find(|t| &t.id == train_id) {
                    Some(train) => train.shift(*delay_min),
                    None => log::debug!("delay for unknown train {train_id} ignored"),
                }
            }
            Disruption::Blockage {
                section_id,
                start_min,
                end_min,
            } => {
                self.blocks
                    .push(SectionBlock::new(section_id.as_str(), *start_min, *end_min));
            }
        }
    }
}

/// Compares two schedules train by train.
pub fn impact_between(previous: &Schedule, next: &Schedule) -> ScheduleImpact {
    let ids: BTreeSet<&String> = previous.trains.keys().chain(next.trains.keys()).collect();
    let affected_trains: Vec<String> = ids
        .into_iter()
        .filter(|id| previous.trains.get(*id) != next.trains.get(*id))
        .cloned()
        .collect();

    ScheduleImpact {
        changes: affected_trains.len(),
        affected_trains,
        improved: next.metrics.average_delay_min < previous.metrics.average_delay_min,
    }
}
