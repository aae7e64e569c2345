//! Priority-based conflict resolution.
//!
//! # Delay Policy
//!
//! Minimum clearing delay. Each participant's unconstrained window on the
//! conflict section is estimated (scheduled departure plus travel over the
//! preceding route sections, then the section's own travel time). The
//! lower-priority train is held by `high.end − low.start` when the two
//! windows overlap, the smallest delay after which it enters the section
//! once the higher-priority train has left. Disjoint windows need no hold.
//!
//! When either train's route does not contain the section, the hold falls
//! back to the length of the conflict span.

use std::collections::HashMap;

use crate::models::{Conflict, Network, Resolution, ResolutionStrategy, Train};
use crate::routing::RouteResolver;
use crate::travel_time;

/// Confidence when the participants' priority scores differ.
pub const HIGH_CONFIDENCE: f64 = 0.85;

/// Confidence when the participants' priority scores tie.
pub const TIED_CONFIDENCE: f64 = 0.5;

const SCORE_EPSILON: f64 = 1e-9;

/// Recommends one action per resolvable conflict.
///
/// Participants are ordered by descending priority score, then earlier
/// scheduled departure, then ID; the first proceeds and the second is held.
/// Conflicts with fewer than two known trains are skipped.
pub fn resolve(
    network: &Network,
    resolver: &dyn RouteResolver,
    conflicts: &[Conflict],
    trains: &[Train],
) -> Vec<Resolution> {
    let by_id: HashMap<&str, &Train> = trains.iter().map(|t| (t.id.as_str(), t)).collect();

    conflicts
        .iter()
        .filter_map(|conflict| {
            let mut participants: Vec<&Train> = conflict
                .train_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).copied())
                .collect();
            if participants.len() < 2 {
                log::debug!("{}: fewer than two known trains", conflict.id);
                return None;
            }
            participants.sort_by(|a, b| {
                b.priority_score()
                    .total_cmp(&a.priority_score())
                    .then_with(|| a.scheduled_departure_min.cmp(&b.scheduled_departure_min))
                    .then_with(|| a.id.cmp(&b.id))
            });
            let (high, low) = (participants[0], participants[1]);

            let delay_min = match (
                window_on(network, resolver, high, &conflict.section_id),
                window_on(network, resolver, low, &conflict.section_id),
            ) {
                (Some(high_window), Some(low_window)) => clearing_delay(high_window, low_window),
                _ => (conflict.end_min - conflict.start_min).max(0),
            };
            let confidence =
                if (high.priority_score() - low.priority_score()).abs() > SCORE_EPSILON {
                    HIGH_CONFIDENCE
                } else {
                    TIED_CONFIDENCE
                };

            Some(Resolution {
                conflict_id: conflict.id.clone(),
                strategy: ResolutionStrategy::PriorityDelay,
                delayed_train: low.id.clone(),
                priority_train: high.id.clone(),
                delay_min,
                confidence,
                action: format!(
                    "Delay {} by {delay_min} min to allow {} to clear {}",
                    low.id, high.id, conflict.section_id
                ),
            })
        })
        .collect()
}

/// Hold on `low` so it enters only after `high` has left; zero when the
/// windows are disjoint.
fn clearing_delay((high_start, high_end): (i64, i64), (low_start, low_end): (i64, i64)) -> i64 {
    if low_end <= high_start || low_start >= high_end {
        0
    } else {
        high_end - low_start
    }
}

/// Unconstrained `[start, end)` of `train` on `section_id`.
fn window_on(
    network: &Network,
    resolver: &dyn RouteResolver,
    train: &Train,
    section_id: &str,
) -> Option<(i64, i64)> {
    let route = resolver.resolve(network, train);
    let position = route.iter().position(|s| s == section_id)?;
    let start = train.scheduled_departure_min
        + route[..position]
            .iter()
            .map(|s| travel_time::estimate(network, train, s))
            .sum::<i64>();
    Some((start, start + travel_time::estimate(network, train, section_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::detect;
    use crate::models::{ConflictKind, Section, SectionKind, TrainKind, TrainPriority};
    use crate::routing::DirectAdjacency;

    // A: 10 km double line → 7 min; J1: 1 km junction → 3 min (at 100 km/h)
    fn network() -> Network {
        Network::new("n")
            .with_section(Section::new("A", SectionKind::DoubleLine, 10.0).with_capacity(2))
            .with_section(Section::new("J1", SectionKind::Junction, 1.0))
            .with_connection("A", "J1", None)
    }

    fn train(id: &str, priority: TrainPriority, departure: i64) -> Train {
        Train::new(id, TrainKind::Local)
            .with_priority(priority)
            .with_timing(departure, departure + 10)
            .with_route(["A", "J1"])
    }

    #[test]
    fn test_low_priority_is_delayed() {
        let trains = vec![
            train("LOW", TrainPriority::Low, 0),
            train("HIGH", TrainPriority::High, 0),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &trains);
        let res = resolve(&network(), &DirectAdjacency, &conflicts, &trains);

        assert_eq!(res.len(), 1);
        let r = &res[0];
        assert_eq!(r.delayed_train, "LOW");
        assert_eq!(r.priority_train, "HIGH");
        assert_eq!(r.strategy, ResolutionStrategy::PriorityDelay);
        // Both enter J1 at 7; HIGH leaves at 10.
        assert_eq!(r.delay_min, 3);
        assert!((r.confidence - HIGH_CONFIDENCE).abs() < 1e-10);
        assert!(r.action.contains("Delay LOW"));
    }

    #[test]
    fn test_no_delay_when_already_clear() {
        let trains = vec![
            train("HIGH", TrainPriority::High, 0),
            train("LOW", TrainPriority::Low, 20),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &trains);
        let res = resolve(&network(), &DirectAdjacency, &conflicts, &trains);
        assert_eq!(res[0].delay_min, 0);
    }

    #[test]
    fn test_no_delay_when_low_priority_clears_first() {
        // LOW on J1: [7, 10); HIGH on J1: [57, 60)
        let trains = vec![
            train("HIGH", TrainPriority::High, 50),
            train("LOW", TrainPriority::Low, 0),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &trains);
        let res = resolve(&network(), &DirectAdjacency, &conflicts, &trains);
        assert_eq!(res[0].delayed_train, "LOW");
        assert_eq!(res[0].delay_min, 0);
    }

    #[test]
    fn test_clearing_delay_windows() {
        assert_eq!(clearing_delay((7, 10), (7, 10)), 3);
        assert_eq!(clearing_delay((7, 10), (9, 12)), 1);
        assert_eq!(clearing_delay((7, 10), (5, 8)), 5);
        assert_eq!(clearing_delay((7, 10), (10, 13)), 0);
        assert_eq!(clearing_delay((57, 60), (7, 10)), 0);
    }

    #[test]
    fn test_tie_uses_departure_then_id() {
        let trains = vec![
            train("B", TrainPriority::Medium, 0),
            train("A", TrainPriority::Medium, 0),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &trains);
        let res = resolve(&network(), &DirectAdjacency, &conflicts, &trains);
        assert_eq!(res[0].priority_train, "A");
        assert_eq!(res[0].delayed_train, "B");
        assert!((res[0].confidence - TIED_CONFIDENCE).abs() < 1e-10);

        let later = vec![
            train("A", TrainPriority::Medium, 2),
            train("B", TrainPriority::Medium, 0),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &later);
        let res = resolve(&network(), &DirectAdjacency, &conflicts, &later);
        assert_eq!(res[0].priority_train, "B");
        // B on J1: [7, 10); A on J1: [9, 12)
        assert_eq!(res[0].delay_min, 1);
    }

    #[test]
    fn test_section_off_route_uses_span() {
        let trains = vec![
            train("HIGH", TrainPriority::High, 0),
            train("LOW", TrainPriority::Low, 0),
        ];
        let conflict = Conflict::pair(ConflictKind::CapacityExceeded, "HIGH", "LOW", "ELSEWHERE", 5, 25);
        let res = resolve(&network(), &DirectAdjacency, &[conflict], &trains);
        assert_eq!(res[0].delay_min, 20);
    }

    #[test]
    fn test_unknown_trains_skipped() {
        let trains = vec![train("HIGH", TrainPriority::High, 0)];
        let conflict = Conflict::pair(ConflictKind::CapacityExceeded, "HIGH", "GHOST", "J1", 0, 10);
        assert!(resolve(&network(), &DirectAdjacency, &[conflict], &trains).is_empty());
    }
}
