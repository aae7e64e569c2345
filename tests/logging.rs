//! Diagnostics emitted through the `log` facade.
//!
//! Kept in its own test binary: the capturing logger is process-global.

use log::Level;
use logtest::Logger;

use u_rail::conflict;
use u_rail::models::{Network, Schedule, ScheduledSegment, Section, SectionKind, Train, TrainKind};
use u_rail::routing::DirectAdjacency;

fn network() -> Network {
    Network::new("n")
        .with_section(Section::new("A", SectionKind::DoubleLine, 10.0).with_capacity(2))
        .with_section(Section::new("J1", SectionKind::Junction, 1.0))
        .with_connection("A", "J1", None)
}

fn warnings(logger: &mut Logger) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(record) = logger.pop() {
        if record.level() == Level::Warn {
            out.push(record.args().to_string());
        }
    }
    out
}

#[test]
fn test_unknown_sections_are_reported() {
    let mut logger = Logger::start();

    let trains = vec![
        Train::new("T1", TrainKind::Local).with_route(["A", "GHOST"]),
        Train::new("T2", TrainKind::Local).with_route(["A", "GHOST"]),
    ];
    let conflicts = conflict::detect(&network(), &DirectAdjacency, &trains);
    assert!(conflicts.is_empty());
    let logged = warnings(&mut logger);
    assert!(
        logged.iter().any(|m| m.contains("GHOST")),
        "no warning for GHOST in {logged:?}"
    );

    let mut schedule = Schedule::new();
    schedule.add_segment(ScheduledSegment::new("T1", "PHANTOM", 0, 5));
    schedule.add_segment(ScheduledSegment::new("T2", "PHANTOM", 0, 5));
    assert!(conflict::detect_in_schedule(&network(), &schedule).is_empty());
    let logged = warnings(&mut logger);
    assert!(
        logged.iter().any(|m| m.contains("PHANTOM")),
        "no warning for PHANTOM in {logged:?}"
    );
}
