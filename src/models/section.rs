//! Track section model.
//!
//! A section is an indivisible stretch of track that at most `capacity`
//! trains may occupy at once. Sections carry both static attributes
//! (length, speed limit, kind) and live occupancy state.

use serde::{Deserialize, Serialize};

/// Kind of track section.
///
/// Determines the fixed buffer added to travel-time estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Station platform track.
    Platform,
    /// Switch/crossing area.
    Junction,
    /// Single-track line (both directions share the track).
    SingleLine,
    /// Double-track line.
    DoubleLine,
    /// Three or more parallel tracks.
    MultipleLine,
    /// Marshalling or storage yard.
    Yard,
}

impl SectionKind {
    /// Buffer (minutes) added on top of running time.
    pub fn buffer_min(self) -> i64 {
        match self {
            SectionKind::Platform => 5,
            SectionKind::Junction => 3,
            SectionKind::SingleLine => 2,
            SectionKind::DoubleLine => 1,
            SectionKind::MultipleLine | SectionKind::Yard => 2,
        }
    }
}

/// Live status of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    #[default]
    Available,
    /// Held for one train that has not entered yet.
    Reserved,
    /// At least one train is inside.
    Occupied,
    /// Closed by an incident.
    Blocked,
    /// Closed for planned works.
    Maintenance,
}

/// A track section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Section kind.
    pub kind: SectionKind,
    /// Length (km).
    pub length_km: f64,
    /// Speed limit (km/h).
    pub speed_limit_kmh: f64,
    /// Maximum simultaneous occupants (≥ 1).
    pub capacity: usize,
    /// Adjacent section IDs, in insertion order.
    pub connected: Vec<String>,
    /// Live status.
    pub status: SectionStatus,
    /// Trains currently inside, in entry order.
    pub occupants: Vec<String>,
    /// Train holding a reservation, if any.
    pub reserved_for: Option<String>,
}

impl Section {
    /// Creates an available single-capacity section with a 100 km/h limit.
    pub fn new(id: impl Into<String>, kind: SectionKind, length_km: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            length_km,
            speed_limit_kmh: 100.0,
            capacity: 1,
            connected: Vec::new(),
            status: SectionStatus::Available,
            occupants: Vec::new(),
            reserved_for: None,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the speed limit.
    pub fn with_speed_limit(mut self, speed_limit_kmh: f64) -> Self {
        self.speed_limit_kmh = speed_limit_kmh;
        self
    }

    /// Sets the capacity. Values below 1 are raised to 1.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Adds an adjacent section.
    pub fn with_connection(mut self, section_id: impl Into<String>) -> Self {
        let id = section_id.into();
        if !self.connected.contains(&id) {
            self.connected.push(id);
        }
        self
    }

    /// Whether another train may enter now.
    #[inline]
    pub fn has_capacity(&self) -> bool {
        self.occupants.len() < self.capacity
    }

    /// Whether the given train is inside.
    pub fn is_occupied_by(&self, train_id: &str) -> bool {
        self.occupants.iter().any(|t| t == train_id)
    }

    /// Whether the section is closed (blocked or under maintenance).
    pub fn is_closed(&self) -> bool {
        matches!(
            self.status,
            SectionStatus::Blocked | SectionStatus::Maintenance
        )
    }
}
