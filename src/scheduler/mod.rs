//! Scheduling engine and KPI evaluation.
//!
//! Assigns every train a capacity-respecting window on each section of its
//! route, preferring earlier completion for higher-priority trains.
//!
//! # Algorithm
//!
//! `SchedulingEngine` runs a priority-ordered greedy construction over
//! per-section timelines, followed by a bounded local-search repair of the
//! dispatch order. Capacity and precedence hold by construction; the
//! repair only ever keeps complete, valid placements.
//!
//! # Cancellation
//!
//! A [`CancellationToken`] attached to an [`OptimizationRequest`] stops the
//! repair phase at the next iteration boundary. The best schedule found so
//! far is returned.
//!
//! # KPI
//!
//! `ScheduleKpi` computes makespan, arrival delay, on-time rate, section
//! utilization and journey time.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - D'Ariano et al. (2007), "A branch and bound algorithm for scheduling
//!   trains in a railway network"

mod cancel;
mod engine;
mod kpi;
mod repair;
mod timeline;

pub use cancel::CancellationToken;
pub use engine::{OptimizationRequest, SchedulingEngine};
pub use kpi::ScheduleKpi;
