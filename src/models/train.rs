//! Train model.
//!
//! A train is a unit of work to be scheduled: it must traverse its route
//! section by section, no earlier than its scheduled departure.
//!
//! # Time Representation
//! All times are in minutes relative to a scheduling epoch (t=0).
//! The consumer defines what t=0 means (e.g. start of the operating day).

use serde::{Deserialize, Serialize};

/// Train category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainKind {
    Express,
    Local,
    Freight,
    Maintenance,
    Special,
}

impl TrainKind {
    /// Multiplier applied to the base priority.
    pub fn multiplier(self) -> f64 {
        match self {
            TrainKind::Express => 1.5,
            TrainKind::Local => 1.0,
            TrainKind::Freight => 0.8,
            TrainKind::Maintenance => 0.5,
            TrainKind::Special => 1.0,
        }
    }
}

/// Base priority (higher = more important).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrainPriority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Critical = 4,
    Emergency = 5,
}

impl TrainPriority {
    /// Numeric level (1..=5).
    #[inline]
    pub fn level(self) -> u8 {
        self as u8
    }
}

/// A train to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    /// Unique train identifier.
    pub id: String,
    /// Official train number.
    pub number: String,
    /// Human-readable name.
    pub name: String,
    /// Train category.
    pub kind: TrainKind,
    /// Base priority.
    pub priority: TrainPriority,
    /// Origin section.
    pub origin: String,
    /// Destination section.
    pub destination: String,
    /// Scheduled departure (min).
    pub scheduled_departure_min: i64,
    /// Scheduled arrival (min).
    pub scheduled_arrival_min: i64,
    /// Actual departure (min), once known. Feeds the delay penalty.
    pub actual_departure_min: Option<i64>,
    /// Maximum speed (km/h).
    pub max_speed_kmh: f64,
    /// Explicit route. Empty = resolve from origin/destination.
    pub route: Vec<String>,
}

impl Train {
    /// Highest score `priority_score` can return: emergency express,
    /// carrying the full delay penalty.
    pub const MAX_PRIORITY_SCORE: f64 = 5.0 * 1.5 + Self::MAX_DELAY_PENALTY;

    /// Delay penalty ceiling (2 hours of delay).
    pub const MAX_DELAY_PENALTY: f64 = 2.0;

    /// Creates a medium-priority local train departing at t=0.
    pub fn new(id: impl Into<String>, kind: TrainKind) -> Self {
        Self {
            id: id.into(),
            number: String::new(),
            name: String::new(),
            kind,
            priority: TrainPriority::Medium,
            origin: String::new(),
            destination: String::new(),
            scheduled_departure_min: 0,
            scheduled_arrival_min: 0,
            actual_departure_min: None,
            max_speed_kmh: 100.0,
            route: Vec::new(),
        }
    }

    /// Sets the train number.
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the base priority.
    pub fn with_priority(mut self, priority: TrainPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets origin and destination.
    pub fn with_endpoints(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin = origin.into();
        self.destination = destination.into();
        self
    }

    /// Sets scheduled departure and arrival.
    pub fn with_timing(mut self, departure_min: i64, arrival_min: i64) -> Self {
        self.scheduled_departure_min = departure_min;
        self.scheduled_arrival_min = arrival_min;
        self
    }

    /// Records the actual departure.
    pub fn with_actual_departure(mut self, departure_min: i64) -> Self {
        self.actual_departure_min = Some(departure_min);
        self
    }

    /// Sets the maximum speed.
    pub fn with_max_speed(mut self, max_speed_kmh: f64) -> Self {
        self.max_speed_kmh = max_speed_kmh;
        self
    }

    /// Sets an explicit route. Origin/destination default to its ends.
    pub fn with_route<I, S>(mut self, route: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route = route.into_iter().map(Into::into).collect();
        if self.origin.is_empty() {
            if let Some(first) = self.route.first() {
                self.origin = first.clone();
            }
        }
        if self.destination.is_empty() {
            if let Some(last) = self.route.last() {
                self.destination = last.clone();
            }
        }
        self
    }

    /// Whether the train carries its own route.
    pub fn has_explicit_route(&self) -> bool {
        !self.route.is_empty()
    }

    /// Departure delay (min), zero when on time or unknown.
    pub fn departure_delay_min(&self) -> i64 {
        self.actual_departure_min
            .map(|actual| (actual - self.scheduled_departure_min).max(0))
            .unwrap_or(0)
    }

    /// Derived priority score.
    ///
    /// `level × kind multiplier + min(delay hours, 2.0)`.
    pub fn priority_score(&self) -> f64 {
        let base = f64::from(self.priority.level()) * self.kind.multiplier();
        let penalty = (self.departure_delay_min() as f64 / 60.0).min(Self::MAX_DELAY_PENALTY);
        base + penalty
    }

    /// Shifts scheduled departure and arrival by `delay_min` (may be negative).
    pub fn shift(&mut self, delay_min: i64) {
        self.scheduled_departure_min += delay_min;
        self.scheduled_arrival_min += delay_min;
    }
}
