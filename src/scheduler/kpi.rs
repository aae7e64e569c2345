//! Schedule quality metrics (KPIs).
//!
//! Computes railway performance indicators from a completed schedule and
//! its input trains.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Latest segment end |
//! | Total Delay | Sum of max(0, completion - scheduled arrival) |
//! | Maximum Delay | Largest single delay |
//! | On-Time Rate | Fraction arriving no later than scheduled |
//! | Avg Utilization | Mean section busyness, scaled by capacity |
//! | Avg Journey Time | Mean time from release to completion |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::HashMap;

use crate::models::{Network, Schedule, Train};

/// Schedule performance indicators.
///
/// All time values are in minutes.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Makespan: latest segment end (min).
    pub makespan_min: i64,
    /// Sum of arrival delays across scheduled trains (min).
    pub total_delay_min: i64,
    /// Largest arrival delay of any single train (min).
    pub max_delay_min: i64,
    /// Fraction of scheduled trains arriving on time (0.0..1.0).
    pub on_time_rate: f64,
    /// Average section utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-section utilization: busy time / (makespan × capacity).
    pub utilization_by_section: HashMap<String, f64>,
    /// Average journey time: mean(completion - release) in minutes.
    pub avg_journey_min: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its input trains.
    ///
    /// Trains absent from the schedule (excluded or infeasible) are not
    /// counted. Sections unknown to `network` are treated as capacity 1.
    pub fn calculate(schedule: &Schedule, trains: &[Train], network: &Network) -> Self {
        let makespan = schedule.makespan_min();
        let mut total_delay: i64 = 0;
        let mut max_delay: i64 = 0;
        let mut on_time_count: usize = 0;
        let mut total_journey: f64 = 0.0;
        let mut counted: usize = 0;

        for train in trains {
            let Some(completion) = schedule.completion_time(&train.id) else {
                continue;
            };
            counted += 1;

            let release = train.scheduled_departure_min.max(0);
            total_journey += (completion - release) as f64;

            let delay = (completion - train.scheduled_arrival_min).max(0);
            if delay > 0 {
                total_delay += delay;
                max_delay = max_delay.max(delay);
            } else {
                on_time_count += 1;
            }
        }

        let utilization_by_section: HashMap<String, f64> = schedule
            .section_utilizations()
            .into_iter()
            .map(|(id, busy)| {
                let capacity = network.section(&id).map_or(1, |s| s.capacity.max(1));
                (id, busy / capacity as f64)
            })
            .collect();
        let avg_utilization = if utilization_by_section.is_empty() {
            0.0
        } else {
            utilization_by_section.values().sum::<f64>() / utilization_by_section.len() as f64
        };

        let on_time_rate = if counted == 0 {
            1.0
        } else {
            on_time_count as f64 / counted as f64
        };
        let avg_journey_min = if counted == 0 {
            0.0
        } else {
            total_journey / counted as f64
        };

        Self {
            makespan_min: makespan,
            total_delay_min: total_delay,
            max_delay_min: max_delay,
            on_time_rate,
            avg_utilization,
            utilization_by_section,
            avg_journey_min,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_delay_min: i64, min_on_time_rate: f64) -> bool {
        self.max_delay_min <= max_delay_min && self.on_time_rate >= min_on_time_rate
    }
}
