//! Disruption events and section blocks.

use serde::{Deserialize, Serialize};

/// A real-world event that alters planned timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Disruption {
    /// Shift a train's scheduled departure and arrival (may be negative).
    Delay { train_id: String, delay_min: i64 },
    /// Close a section for `[start_min, end_min)`.
    Blockage {
        section_id: String,
        start_min: i64,
        end_min: i64,
    },
}

impl Disruption {
    /// Creates a delay event.
    pub fn delay(train_id: impl Into<String>, delay_min: i64) -> Self {
        Self::Delay {
            train_id: train_id.into(),
            delay_min,
        }
    }

    /// Creates a blockage event.
    pub fn blockage(section_id: impl Into<String>, start_min: i64, end_min: i64) -> Self {
        Self::Blockage {
            section_id: section_id.into(),
            start_min,
            end_min,
        }
    }
}

/// A window during which no train may use a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub section_id: String,
    pub start_min: i64,
    pub end_min: i64,
}

impl SectionBlock {
    /// Creates a block. An inverted window is normalized.
    pub fn new(section_id: impl Into<String>, start_min: i64, end_min: i64) -> Self {
        Self {
            section_id: section_id.into(),
            start_min: start_min.min(end_min),
            end_min: start_min.max(end_min),
        }
    }

    /// Whether `[start, end)` intersects the block.
    #[inline]
    pub fn overlaps(&self, start_min: i64, end_min: i64) -> bool {
        start_min < self.end_min && self.start_min < end_min
    }
}
