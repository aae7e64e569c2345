//! Capacity conflict detection.

use std::collections::BTreeMap;

use crate::models::{Conflict, ConflictKind, Network, Schedule, ScheduledSegment, Train};
use crate::routing::RouteResolver;

/// Structural conflicts among `trains`.
///
/// Groups trains by every section on their resolved route. Where more
/// distinct trains use a section than its capacity, one conflict is
/// emitted per unordered pair, spanning the earliest of the two scheduled
/// departures to the latest of the two scheduled arrivals.
///
/// Sections are visited in ID order and pairs in input order. Sections
/// unknown to the network are skipped with a warning; trains without a
/// route are skipped.
pub fn detect(network: &Network, resolver: &dyn RouteResolver, trains: &[Train]) -> Vec<Conflict> {
    let mut usage: BTreeMap<String, Vec<&Train>> = BTreeMap::new();
    for train in trains {
        for section_id in resolver.resolve(network, train) {
            let users = usage.entry(section_id).or_default();
            if !users.iter().any(|t| t.id == train.id) {
                users.push(train);
            }
        }
    }

    let mut conflicts = Vec::new();
    for (section_id, users) in &usage {
        let Some(section) = network.section(section_id) else {
            log::warn!("conflict check skipped unknown section {section_id}");
            continue;
        };
        if users.len() <= section.capacity {
            continue;
        }

        for (i, a) in users.iter().enumerate() {
            for b in &users[i + 1..] {
                conflicts.push(Conflict::pair(
                    ConflictKind::CapacityExceeded,
                    &a.id,
                    &b.id,
                    section_id,
                    a.scheduled_departure_min.min(b.scheduled_departure_min),
                    a.scheduled_arrival_min.max(b.scheduled_arrival_min),
                ));
            }
        }
    }

    log::debug!("{} structural conflict(s) among {} train(s)", conflicts.len(), trains.len());
    conflicts
}

/// Temporal conflicts in a committed schedule.
///
/// Emits a conflict for every pair of segments that overlap on a section
/// during an instant where more segments are active than the section's
/// capacity. The span is the overlap of the two segments. Schedules
/// produced by the engine yield none.
pub fn detect_in_schedule(network: &Network, schedule: &Schedule) -> Vec<Conflict> {
    let mut by_section: BTreeMap<&str, Vec<&ScheduledSegment>> = BTreeMap::new();
    for segment in schedule.segments() {
        by_section
            .entry(segment.section_id.as_str())
            .or_default()
            .push(segment);
    }

    let mut conflicts = Vec::new();
    for (section_id, mut segments) in by_section {
        let Some(section) = network.section(section_id) else {
            log::warn!("overlap check skipped unknown section {section_id}");
            continue;
        };
        segments.sort_by(|a, b| {
            a.start_min
                .cmp(&b.start_min)
                .then_with(|| a.train_id.cmp(&b.train_id))
        });

        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                if b.start_min >= a.end_min {
                    break;
                }
                if a.train_id == b.train_id {
                    continue;
                }
                let start = a.start_min.max(b.start_min);
                let end = a.end_min.min(b.end_min);
                if load_at(&segments, start, end) > section.capacity {
                    conflicts.push(Conflict::pair(
                        ConflictKind::ScheduledOverlap,
                        &a.train_id,
                        &b.train_id,
                        section_id,
                        start,
                        end,
                    ));
                }
            }
        }
    }
    conflicts
}

/// Peak number of segments active inside `[start, end)`.
fn load_at(segments: &[&ScheduledSegment], start: i64, end: i64) -> usize {
    let mut events: Vec<(i64, i32)> = Vec::new();
    for s in segments {
        if s.start_min < end && start < s.end_min {
            events.push((s.start_min.max(start), 1));
            events.push((s.end_min.min(end), -1));
        }
    }
    events.sort_unstable();

    let mut load = 0;
    let mut peak = 0;
    for (_, delta) in events {
        load += delta;
        peak = peak.max(load);
    }
    peak.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Section, SectionKind, TrainKind, TrainPriority};
    use crate::routing::DirectAdjacency;
    use std::collections::BTreeSet;

    fn network() -> Network {
        Network::new("n")
            .with_section(Section::new("A", SectionKind::DoubleLine, 5.0).with_capacity(2))
            .with_section(Section::new("J1", SectionKind::Junction, 1.0))
            .with_connection("A", "J1", None)
    }

    fn train(id: &str, departure: i64, arrival: i64, route: &[&str]) -> Train {
        Train::new(id, TrainKind::Local)
            .with_timing(departure, arrival)
            .with_route(route.iter().copied())
    }

    #[test]
    fn test_single_pair_on_junction() {
        let trains = vec![
            train("HIGH", 0, 30, &["A", "J1"]).with_priority(TrainPriority::High),
            train("LOW", 5, 40, &["A", "J1"]).with_priority(TrainPriority::Low),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &trains);

        // A holds two trains; only J1 is over capacity.
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.id, "CONF_HIGH_LOW_J1");
        assert_eq!(c.section_id, "J1");
        assert_eq!((c.start_min, c.end_min), (0, 40));
        assert_eq!(c.severity, Conflict::STRUCTURAL_SEVERITY);
    }

    #[test]
    fn test_all_pairs_when_over_capacity() {
        let trains = vec![
            train("T1", 0, 10, &["A"]),
            train("T2", 0, 10, &["A"]),
            train("T3", 0, 10, &["A"]),
        ];
        let conflicts = detect(&network(), &DirectAdjacency, &trains);
        let ids: Vec<&str> = conflicts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["CONF_T1_T2_A", "CONF_T1_T3_A", "CONF_T2_T3_A"]);
    }

    #[test]
    fn test_symmetric_under_input_order() {
        let forward = vec![train("X", 0, 10, &["J1"]), train("Y", 0, 10, &["J1"])];
        let backward = vec![forward[1].clone(), forward[0].clone()];

        let pairs = |trains: &[Train]| -> BTreeSet<(String, BTreeSet<String>)> {
            detect(&network(), &DirectAdjacency, trains)
                .into_iter()
                .map(|c| (c.section_id, c.train_ids.into_iter().collect()))
                .collect()
        };
        assert_eq!(pairs(&forward), pairs(&backward));
        assert_eq!(pairs(&forward).len(), 1);
    }

    #[test]
    fn test_repeated_section_counts_once() {
        let trains = vec![train("T1", 0, 10, &["J1", "A", "J1"])];
        assert!(detect(&network(), &DirectAdjacency, &trains).is_empty());
    }

    #[test]
    fn test_unknown_sections_and_routes_skipped() {
        let trains = vec![
            train("T1", 0, 10, &["GHOST"]),
            train("T2", 0, 10, &["GHOST"]),
            Train::new("T3", TrainKind::Local).with_endpoints("A", "NOWHERE"),
        ];
        assert!(detect(&network(), &DirectAdjacency, &trains).is_empty());
    }

    #[test]
    fn test_schedule_overlap() {
        let mut schedule = Schedule::new();
        schedule.add_segment(ScheduledSegment::new("T1", "J1", 0, 10));
        schedule.add_segment(ScheduledSegment::new("T2", "J1", 5, 15));
        schedule.add_segment(ScheduledSegment::new("T3", "J1", 15, 20));
        schedule.add_segment(ScheduledSegment::new("T1", "A", 0, 10));
        schedule.add_segment(ScheduledSegment::new("T2", "A", 0, 10));

        let conflicts = detect_in_schedule(&network(), &schedule);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.id, "CONF_T1_T2_J1");
        assert_eq!(c.kind, ConflictKind::ScheduledOverlap);
        assert_eq!((c.start_min, c.end_min), (5, 10));
        assert_eq!(c.severity, Conflict::SCHEDULED_SEVERITY);
    }

    #[test]
    fn test_clean_schedule_has_no_overlaps() {
        let mut schedule = Schedule::new();
        schedule.add_segment(ScheduledSegment::new("T1", "J1", 0, 10));
        schedule.add_segment(ScheduledSegment::new("T2", "J1", 10, 15));
        assert!(detect_in_schedule(&network(), &schedule).is_empty());
    }
}
