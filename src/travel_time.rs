//! Travel-time estimation.
//!
//! Expected occupancy of a train on a section:
//!
//! ```text
//! minutes = floor(length_km / min(train speed, section limit) × 60) + buffer(kind)
//! ```
//!
//! floored at one minute. The estimator never fails: unknown sections and
//! non-positive speeds fall back to [`DEFAULT_TRAVEL_MIN`].

use crate::models::{Network, Train};

/// Fallback when no estimate can be computed.
pub const DEFAULT_TRAVEL_MIN: i64 = 10;

/// Shortest occupancy ever returned.
pub const MIN_TRAVEL_MIN: i64 = 1;

/// Estimates the occupancy (minutes) of `train` on `section_id`.
///
/// # Example
/// ```
/// use u_rail::models::{Network, Section, SectionKind, Train, TrainKind};
/// use u_rail::travel_time::estimate;
///
/// let network = Network::new("n").with_section(
///     Section::new("S1", SectionKind::DoubleLine, 15.0).with_speed_limit(60.0),
/// );
/// let train = Train::new("T1", TrainKind::Express).with_max_speed(120.0);
/// // 15 km at 60 km/h = 15 min, + 1 min double-line buffer
/// assert_eq!(estimate(&network, &train, "S1"), 16);
/// ```
pub fn estimate(network: &Network, train: &Train, section_id: &str) -> i64 {
    let Some(section) = network.section(section_id) else {
        return DEFAULT_TRAVEL_MIN;
    };

    let speed_kmh = train.max_speed_kmh.min(section.speed_limit_kmh);
    if !(speed_kmh > 0.0) {
        return DEFAULT_TRAVEL_MIN;
    }

    let running_min = (section.length_km / speed_kmh * 60.0).floor() as i64;
    (running_min + section.kind.buffer_min()).max(MIN_TRAVEL_MIN)
}

/// Estimates every section of a route, in order.
pub fn estimate_route(network: &Network, train: &Train, route: &[String]) -> Vec<i64> {
    route
        .iter()
        .map(|section_id| estimate(network, train, section_id))
        .collect()
}
