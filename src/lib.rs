//! Railway section scheduling for the U-Engine ecosystem.
//!
//! Assigns conflict-free time windows to trains moving through a network of
//! capacity-limited track sections, detects capacity violations, proposes
//! priority-based resolutions, and re-optimizes when disruptions occur.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Section`, `Network`, `Train`, `Schedule`,
//!   `ScheduledSegment`, `Conflict`, `Resolution`, `Disruption`
//! - **`routing`**: Route resolution strategies (direct adjacency, shortest path)
//! - **`travel_time`**: Per-section occupancy estimates
//! - **`dispatching`**: Train ordering rules and the rule engine
//! - **`scheduler`**: Greedy scheduling engine with bounded local-search
//!   repair, cancellation, and KPI evaluation
//! - **`conflict`**: Structural and schedule-level conflict detection,
//!   priority-based resolution
//! - **`realtime`**: Disruption handling and impact reporting
//! - **`controller`**: Thread-safe entry points over a shared network
//! - **`validation`**: Input integrity and schedule invariant checks
//! - **`config`**: Engine configuration (JSON loadable)
//!
//! # Example
//!
//! ```
//! use u_rail::models::{Network, Section, SectionKind, Train, TrainKind, TrainPriority};
//! use u_rail::scheduler::SchedulingEngine;
//! use u_rail::{conflict, routing::DirectAdjacency};
//!
//! let network = Network::new("demo")
//!     .with_section(Section::new("P1", SectionKind::Platform, 0.4))
//!     .with_section(Section::new("J1", SectionKind::Junction, 1.2))
//!     .with_connection("P1", "J1", None);
//!
//! let trains = vec![
//!     Train::new("IC1", TrainKind::Express)
//!         .with_priority(TrainPriority::High)
//!         .with_timing(0, 30)
//!         .with_route(["P1", "J1"]),
//!     Train::new("RB7", TrainKind::Local)
//!         .with_priority(TrainPriority::Low)
//!         .with_timing(0, 30)
//!         .with_route(["P1", "J1"]),
//! ];
//!
//! let conflicts = conflict::detect(&network, &DirectAdjacency, &trains);
//! assert_eq!(conflicts.len(), 2); // P1 and J1 each hold one train
//!
//! let schedule = SchedulingEngine::default().optimize(&network, &trains, 120);
//! assert!(schedule.is_feasible());
//! assert!(conflict::detect_in_schedule(&network, &schedule).is_empty());
//! ```
//!
//! # Logging
//!
//! Diagnostics go through the `log` facade. The crate never installs a
//! logger.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Cacchiani, Huisman et al. (2014), "An overview of recovery models and
//!   algorithms for real-time railway rescheduling"

pub mod config;
pub mod conflict;
pub mod controller;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod realtime;
pub mod routing;
pub mod scheduler;
pub mod travel_time;
pub mod validation;

pub use error::{ConfigError, Result, ScheduleError};
