//! Input and output validation.
//!
//! Checks structural integrity of networks and train sets before
//! scheduling, and re-checks the invariants of a produced schedule.
//! Detects:
//! - Duplicate IDs
//! - References to unknown sections
//! - Malformed routes and timings
//! - Capacity, precedence and minimum-duration violations in schedules
//!
//! All checks collect every error rather than stopping at the first.

use std::collections::{HashMap, HashSet};

use crate::conflict;
use crate::models::{Network, Schedule, Train};
use crate::travel_time;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A reference to a section that doesn't exist.
    InvalidSectionReference,
    /// A numeric attribute outside its domain.
    InvalidParameter,
    /// A route visits the same section twice in a row.
    InvalidRoute,
    /// Scheduled arrival precedes scheduled departure.
    InvalidTiming,
    /// More segments overlap on a section than its capacity.
    CapacityExceeded,
    /// A segment starts before the previous one on the route ends.
    PrecedenceViolation,
    /// A segment is shorter than the estimated travel time.
    DurationTooShort,
    /// A train enters its first section before its scheduled departure.
    EarlyDeparture,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn into_result(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a network.
///
/// Checks:
/// 1. Capacity of at least one
/// 2. Adjacency only to existing sections
/// 3. Non-negative length, positive speed limit
pub fn validate_network(network: &Network) -> ValidationResult {
    let mut errors = Vec::new();

    for section in network.sections() {
        if section.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Section '{}' has zero capacity", section.id),
            ));
        }
        if !(section.length_km >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Section '{}' has invalid length {}", section.id, section.length_km),
            ));
        }
        if !(section.speed_limit_kmh > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!(
                    "Section '{}' has non-positive speed limit {}",
                    section.id, section.speed_limit_kmh
                ),
            ));
        }
        for next in &section.connected {
            if network.section(next).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSectionReference,
                    format!("Section '{}' connects to unknown section '{next}'", section.id),
                ));
            }
        }
    }

    into_result(errors)
}

/// Validates a train set against a network.
///
/// Checks:
/// 1. No duplicate train IDs
/// 2. Explicit routes only reference existing sections
/// 3. No section repeated consecutively in a route
/// 4. Arrival not before departure
/// 5. Positive maximum speed
pub fn validate_trains(network: &Network, trains: &[Train]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for train in trains {
        if !ids.insert(train.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate train ID: {}", train.id),
            ));
        }

        for section_id in &train.route {
            if network.section(section_id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSectionReference,
                    format!("Train '{}' routes over unknown section '{section_id}'", train.id),
                ));
            }
        }
        for pair in train.route.windows(2) {
            if pair[0] == pair[1] {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRoute,
                    format!("Train '{}' repeats section '{}'", train.id, pair[0]),
                ));
            }
        }

        if train.scheduled_arrival_min < train.scheduled_departure_min {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTiming,
                format!(
                    "Train '{}' arrives at {} before departing at {}",
                    train.id, train.scheduled_arrival_min, train.scheduled_departure_min
                ),
            ));
        }
        if !(train.max_speed_kmh > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Train '{}' has non-positive max speed", train.id),
            ));
        }
    }

    into_result(errors)
}

/// Verifies the invariants of a produced schedule.
///
/// Checks:
/// 1. Capacity never exceeded on any section
/// 2. Consecutive segments of a train do not overlap
/// 3. Every segment lasts at least its estimated travel time
/// 4. No train enters before its scheduled departure (floored at t=0)
pub fn verify_schedule(network: &Network, schedule: &Schedule, trains: &[Train]) -> ValidationResult {
    let mut errors = Vec::new();

    for c in conflict::detect_in_schedule(network, schedule) {
        errors.push(ValidationError::new(
            ValidationErrorKind::CapacityExceeded,
            format!(
                "Section '{}' over capacity during [{}, {}) ({} / {})",
                c.section_id, c.start_min, c.end_min, c.train_ids[0], c.train_ids[1]
            ),
        ));
    }

    let by_id: HashMap<&str, &Train> = trains.iter().map(|t| (t.id.as_str(), t)).collect();
    for (train_id, segments) in &schedule.trains {
        for pair in segments.windows(2) {
            if pair[1].start_min < pair[0].end_min {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PrecedenceViolation,
                    format!(
                        "Train '{train_id}' enters '{}' at {} before leaving '{}' at {}",
                        pair[1].section_id, pair[1].start_min, pair[0].section_id, pair[0].end_min
                    ),
                ));
            }
        }

        let Some(train) = by_id.get(train_id.as_str()) else {
            continue;
        };
        if let Some(first) = segments.first() {
            if first.start_min < train.scheduled_departure_min.max(0) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EarlyDeparture,
                    format!(
                        "Train '{train_id}' departs at {} before {}",
                        first.start_min, train.scheduled_departure_min
                    ),
                ));
            }
        }
        for segment in segments {
            let required = travel_time::estimate(network, train, &segment.section_id);
            if segment.duration_min() < required {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DurationTooShort,
                    format!(
                        "Train '{train_id}' spends {} min on '{}', needs {required}",
                        segment.duration_min(),
                        segment.section_id
                    ),
                ));
            }
        }
    }

    into_result(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduledSegment, Section, SectionKind, TrainKind};
    use crate::scheduler::SchedulingEngine;

    // A: 7 min, J1: 3 min at 100 km/h
    fn sample_network() -> Network {
        Network::new("n")
            .with_section(Section::new("A", SectionKind::DoubleLine, 10.0).with_capacity(2))
            .with_section(Section::new("J1", SectionKind::Junction, 1.0))
            .with_connection("A", "J1", None)
    }

    fn sample_trains() -> Vec<Train> {
        vec![
            Train::new("T1", TrainKind::Local).with_timing(0, 20).with_route(["A", "J1"]),
            Train::new("T2", TrainKind::Freight).with_timing(5, 30).with_route(["A", "J1"]),
        ]
    }

    #[test]
    fn test_valid_network() {
        assert!(validate_network(&sample_network()).is_ok());
    }

    #[test]
    fn test_network_errors() {
        let mut broken = Section::new("X", SectionKind::Yard, -1.0)
            .with_speed_limit(0.0)
            .with_connection("NOWHERE");
        broken.capacity = 0;
        let network = sample_network().with_section(broken);

        let errors = validate_network(&network).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSectionReference));
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidParameter)
                .count(),
            3
        );
    }

    #[test]
    fn test_valid_trains() {
        assert!(validate_trains(&sample_network(), &sample_trains()).is_ok());
    }

    #[test]
    fn test_duplicate_train_id() {
        let mut trains = sample_trains();
        trains.push(Train::new("T1", TrainKind::Local));
        let errors = validate_trains(&sample_network(), &trains).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("T1")));
    }

    #[test]
    fn test_route_and_timing_errors() {
        let trains = vec![Train::new("T9", TrainKind::Local)
            .with_timing(30, 10)
            .with_route(["A", "A", "GHOST"])];
        let errors = validate_trains(&sample_network(), &trains).unwrap_err();
        let kinds: Vec<&ValidationErrorKind> = errors.iter().map(|e| &e.kind).collect();
        assert!(kinds.contains(&&ValidationErrorKind::InvalidSectionReference));
        assert!(kinds.contains(&&ValidationErrorKind::InvalidRoute));
        assert!(kinds.contains(&&ValidationErrorKind::InvalidTiming));
    }

    #[test]
    fn test_engine_output_verifies() {
        let network = sample_network();
        let trains = sample_trains();
        let schedule = SchedulingEngine::default().optimize(&network, &trains, 240);
        assert!(verify_schedule(&network, &schedule, &trains).is_ok());
    }

    #[test]
    fn test_broken_schedule_reports_everything() {
        let network = sample_network();
        let trains = sample_trains();
        let mut schedule = Schedule::new();
        // T1 overlaps its own segments; T2 is too short and too early.
        schedule.add_segment(ScheduledSegment::new("T1", "A", 0, 7));
        schedule.add_segment(ScheduledSegment::new("T1", "J1", 5, 8));
        schedule.add_segment(ScheduledSegment::new("T2", "A", 0, 7));
        schedule.add_segment(ScheduledSegment::new("T2", "J1", 7, 8));

        let errors = verify_schedule(&network, &schedule, &trains).unwrap_err();
        let has = |kind: ValidationErrorKind| errors.iter().any(|e| e.kind == kind);
        assert!(has(ValidationErrorKind::CapacityExceeded));
        assert!(has(ValidationErrorKind::PrecedenceViolation));
        assert!(has(ValidationErrorKind::DurationTooShort));
        assert!(has(ValidationErrorKind::EarlyDeparture));
    }
}
