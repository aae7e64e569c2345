//! Network topology.
//!
//! Sections live in an arena addressed by [`SectionIdx`]; a string lookup
//! maps public identifiers to indices. The network owns all section state.
//! Occupancy changes go exclusively through [`Network::reserve`],
//! [`Network::occupy`] and [`Network::release`], which never leave a
//! section above its capacity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Section, SectionStatus};
use crate::error::{Result, ScheduleError};

/// Stable index of a section inside a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionIdx(usize);

impl SectionIdx {
    /// Arena position.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

/// A railway network: sections, adjacency, and pairwise distances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    /// Network identifier.
    pub id: String,
    sections: Vec<Section>,
    index: HashMap<String, SectionIdx>,
    distances: HashMap<SectionIdx, HashMap<SectionIdx, f64>>,
}

impl Network {
    /// Creates an empty network.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Adds a section, replacing any section with the same ID in place.
    pub fn add_section(&mut self, section: Section) -> SectionIdx {
        if let Some(&idx) = self.index.get(&section.id) {
            self.sections[idx.0] = section;
            return idx;
        }
        let idx = SectionIdx(self.sections.len());
        self.index.insert(section.id.clone(), idx);
        self.sections.push(section);
        idx
    }

    /// Builder form of [`add_section`](Self::add_section).
    pub fn with_section(mut self, section: Section) -> Self {
        self.add_section(section);
        self
    }

    /// Connects two sections in both directions and records their
    /// distance (km) if given.
    pub fn connect(&mut self, a: &str, b: &str, distance_km: Option<f64>) -> Result<()> {
        let ia = self.require(a)?;
        let ib = self.require(b)?;
        for (from, to, to_id) in [(ia, ib, b), (ib, ia, a)] {
            let section = &mut self.sections[from.0];
            if !section.connected.iter().any(|c| c == to_id) {
                section.connected.push(to_id.to_string());
            }
            if let Some(d) = distance_km {
                self.distances.entry(from).or_default().insert(to, d);
            }
        }
        Ok(())
    }

    /// Builder form of [`connect`](Self::connect). Unknown sections are ignored.
    pub fn with_connection(mut self, a: &str, b: &str, distance_km: Option<f64>) -> Self {
        if let Err(e) = self.connect(a, b, distance_km) {
            log::warn!("network '{}': {e}", self.id);
        }
        self
    }

    /// Looks up the arena index of a section.
    #[inline]
    pub fn index_of(&self, section_id: &str) -> Option<SectionIdx> {
        self.index.get(section_id).copied()
    }

    /// Returns a section by ID.
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.index_of(section_id).map(|idx| &self.sections[idx.0])
    }

    /// Returns a section by arena index.
    pub fn section_at(&self, idx: SectionIdx) -> &Section {
        &self.sections[idx.0]
    }

    /// All sections in insertion order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Whether another train may enter the section now.
    ///
    /// Unknown sections have no capacity.
    pub fn capacity_available(&self, section_id: &str) -> bool {
        self.section(section_id).is_some_and(Section::has_capacity)
    }

    /// Whether `b` is adjacent to `a`.
    pub fn connected(&self, a: &str, b: &str) -> bool {
        self.section(a)
            .is_some_and(|s| s.connected.iter().any(|c| c == b))
    }

    /// Distance (km) from `a` to `b`.
    ///
    /// Uses the recorded pairwise distance, falling back to the length of
    /// `a`. `None` only when `a` is unknown.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        let ia = self.index_of(a)?;
        let explicit = self
            .index_of(b)
            .and_then(|ib| self.distances.get(&ia).and_then(|row| row.get(&ib)))
            .copied();
        Some(explicit.unwrap_or(self.sections[ia.0].length_km))
    }

    /// Total distance along a route (sum of consecutive pair distances).
    pub fn route_distance(&self, route: &[String]) -> f64 {
        route
            .windows(2)
            .filter_map(|pair| self.distance(&pair[0], &pair[1]))
            .sum()
    }

    /// IDs of sections currently available.
    pub fn available_sections(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.status == SectionStatus::Available)
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Reserves an unreserved, unoccupied section for a train.
    pub fn reserve(&mut self, section_id: &str, train_id: &str) -> bool {
        logged("reserve", self.try_reserve(section_id, train_id))
    }

    /// Marks a train as inside a section.
    pub fn occupy(&mut self, section_id: &str, train_id: &str) -> bool {
        logged("occupy", self.try_occupy(section_id, train_id))
    }

    /// Removes a train from a section.
    pub fn release(&mut self, section_id: &str, train_id: &str) -> bool {
        logged("release", self.try_release(section_id, train_id))
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, section_id: &str, train_id: &str) -> Result<()> {
        let section = self.section_mut(section_id)?;
        if section.status != SectionStatus::Available
            || section.reserved_for.is_some()
            || !section.occupants.is_empty()
        {
            return Err(rejected(section_id, train_id, "section is not free"));
        }
        section.reserved_for = Some(train_id.to_string());
        section.status = SectionStatus::Reserved;
        Ok(())
    }

    /// Fallible form of [`occupy`](Self::occupy).
    pub fn try_occupy(&mut self, section_id: &str, train_id: &str) -> Result<()> {
        let section = self.section_mut(section_id)?;
        if section.is_closed() {
            return Err(rejected(section_id, train_id, "section is closed"));
        }
        if section.is_occupied_by(train_id) {
            return Err(rejected(section_id, train_id, "train already inside"));
        }
        if !section.has_capacity() {
            return Err(rejected(section_id, train_id, "section is full"));
        }
        section.occupants.push(train_id.to_string());
        section.status = SectionStatus::Occupied;
        section.reserved_for = None;
        Ok(())
    }

    /// Fallible form of [`release`](Self::release).
    pub fn try_release(&mut self, section_id: &str, train_id: &str) -> Result<()> {
        let section = self.section_mut(section_id)?;
        let Some(pos) = section.occupants.iter().position(|t| t == train_id) else {
            return Err(rejected(section_id, train_id, "train is not inside"));
        };
        section.occupants.remove(pos);
        if section.occupants.is_empty() {
            section.status = SectionStatus::Available;
        }
        Ok(())
    }

    fn section_mut(&mut self, section_id: &str) -> Result<&mut Section> {
        let idx = self.require(section_id)?;
        Ok(&mut self.sections[idx.0])
    }

    fn require(&self, section_id: &str) -> Result<SectionIdx> {
        self.index_of(section_id)
            .ok_or_else(|| ScheduleError::UnknownSection(section_id.to_string()))
    }
}

fn logged(op: &str, outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            log::debug!("{op} refused: {e}");
            false
        }
    }
}

fn rejected(section_id: &str, train_id: &str, reason: &str) -> ScheduleError {
    ScheduleError::CapacityViolation {
        section_id: section_id.to_string(),
        train_id: train_id.to_string(),
        reason: reason.to_string(),
    }
}
