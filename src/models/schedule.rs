//! Schedule (solution) model.
//!
//! A schedule assigns every scheduled train a time window on each section
//! of its route. Trains that could not be scheduled are listed with the
//! reason instead of failing the whole run.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Every train runs at its unconstrained earliest times.
    Optimal,
    /// All constraints hold; some trains had to wait.
    #[default]
    Feasible,
    /// The horizon cannot hold the required spans. No segments.
    Infeasible,
}

/// One train's occupancy window on one section.
///
/// Half-open interval `[start_min, end_min)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSegment {
    /// Train ID.
    pub train_id: String,
    /// Section ID.
    pub section_id: String,
    /// Entry time (min).
    pub start_min: i64,
    /// Exit time (min).
    pub end_min: i64,
}

/// A train excluded from a solve, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTrain {
    pub train_id: String,
    pub error: ScheduleError,
}

/// Aggregate solve metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Trains submitted.
    pub total_trains: usize,
    /// Trains with segments in the schedule.
    pub scheduled_trains: usize,
    /// Mean of max(0, completion − scheduled arrival) over scheduled trains.
    pub average_delay_min: f64,
    /// Objective value: Σ completion × (K − priority score).
    pub weighted_completion: f64,
    /// Wall-clock solve time (ms).
    pub solve_time_ms: f64,
    /// Repair moves evaluated.
    pub repair_iterations: usize,
    /// Repair moves accepted.
    pub repair_improvements: usize,
}

/// A complete schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Solve outcome.
    pub status: SolveStatus,
    /// Segments per train, in route order. Keyed by train ID.
    pub trains: BTreeMap<String, Vec<ScheduledSegment>>,
    /// Aggregate metrics.
    pub metrics: ScheduleMetrics,
    /// Trains left out of this solve.
    pub excluded: Vec<ExcludedTrain>,
}

impl ScheduledSegment {
    /// Creates a new segment.
    pub fn new(
        train_id: impl Into<String>,
        section_id: impl Into<String>,
        start_min: i64,
        end_min: i64,
    ) -> Self {
        Self {
            train_id: train_id.into(),
            section_id: section_id.into(),
            start_min,
            end_min,
        }
    }

    /// Occupancy duration (min).
    #[inline]
    pub fn duration_min(&self) -> i64 {
        self.end_min - self.start_min
    }

    /// Whether two segments overlap in time.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }
}

impl Schedule {
    /// Creates an empty feasible schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// An infeasible result: no segments, zeroed metrics.
    pub fn infeasible(total_trains: usize, excluded: Vec<ExcludedTrain>) -> Self {
        Self {
            status: SolveStatus::Infeasible,
            trains: BTreeMap::new(),
            metrics: ScheduleMetrics {
                total_trains,
                ..ScheduleMetrics::default()
            },
            excluded,
        }
    }

    /// Appends a segment to its train's list.
    pub fn add_segment(&mut self, segment: ScheduledSegment) {
        self.trains
            .entry(segment.train_id.clone())
            .or_default()
            .push(segment);
    }

    /// Whether the solve produced a usable schedule.
    pub fn is_feasible(&self) -> bool {
        self.status != SolveStatus::Infeasible
    }

    /// Segments of one train, in route order.
    pub fn segments_for_train(&self, train_id: &str) -> &[ScheduledSegment] {
        self.trains.get(train_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Segments on one section, ordered by start time then train ID.
    pub fn segments_for_section(&self, section_id: &str) -> Vec<&ScheduledSegment> {
        let mut segments: Vec<&ScheduledSegment> = self
            .segments()
            .filter(|s| s.section_id == section_id)
            .collect();
        segments.sort_by(|a, b| {
            a.start_min
                .cmp(&b.start_min)
                .then_with(|| a.train_id.cmp(&b.train_id))
        });
        segments
    }

    /// First segment of a train on a section.
    pub fn segment(&self, train_id: &str, section_id: &str) -> Option<&ScheduledSegment> {
        self.segments_for_train(train_id)
            .iter()
            .find(|s| s.section_id == section_id)
    }

    /// All segments, grouped by train ID.
    pub fn segments(&self) -> impl Iterator<Item = &ScheduledSegment> {
        self.trains.values().flatten()
    }

    /// Completion time of a train (end of its last segment).
    pub fn completion_time(&self, train_id: &str) -> Option<i64> {
        self.segments_for_train(train_id).last().map(|s| s.end_min)
    }

    /// Makespan: latest end time across all segments (min).
    pub fn makespan_min(&self) -> i64 {
        self.segments().map(|s| s.end_min).max().unwrap_or(0)
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.trains.values().map(Vec::len).sum()
    }

    /// Whether a train was excluded.
    pub fn is_excluded(&self, train_id: &str) -> bool {
        self.excluded.iter().any(|e| e.train_id == train_id)
    }

    /// Busy time per section over the makespan.
    pub fn section_utilizations(&self) -> HashMap<String, f64> {
        let horizon = self.makespan_min();
        if horizon <= 0 {
            return HashMap::new();
        }

        let mut busy: HashMap<String, i64> = HashMap::new();
        for s in self.segments() {
            *busy.entry(s.section_id.clone()).or_insert(0) += s.duration_min();
        }

        busy.into_iter()
            .map(|(id, b)| (id, b as f64 / horizon as f64))
            .collect()
    }
}
