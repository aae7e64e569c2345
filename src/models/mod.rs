//! Railway scheduling domain models.
//!
//! Provides the data types for describing a network, the trains that run
//! on it, and the schedules, conflicts and resolutions computed for them.
//!
//! # Scheduling Mapping
//!
//! | u-rail | Generic scheduling |
//! |--------|--------------------|
//! | Train | Task / Job |
//! | Route section | Activity (operation) |
//! | Section | Resource with capacity |
//! | ScheduledSegment | Assignment |

mod conflict;
mod disruption;
mod network;
mod schedule;
mod section;
mod train;

pub use conflict::{Conflict, ConflictKind, Resolution, ResolutionStrategy};
pub use disruption::{Disruption, SectionBlock};
pub use network::{Network, SectionIdx};
pub use schedule::{ExcludedTrain, Schedule, ScheduleMetrics, ScheduledSegment, SolveStatus};
pub use section::{Section, SectionKind, SectionStatus};
pub use train::{Train, TrainKind, TrainPriority};
