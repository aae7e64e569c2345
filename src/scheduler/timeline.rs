//! Per-section occupancy timeline.
//!
//! # Algorithm
//!
//! A section admits a window `[t, t + d)` when no block intersects it and
//! fewer than `capacity` committed intervals are simultaneously active at
//! every instant inside it. Feasibility can only switch from "no" to "yes"
//! as `t` passes the end of a committed interval or block, so the earliest
//! fit is found among `{from} ∪ {ends > from}`, tried in ascending order.
//!
//! # Complexity
//! O(k² log k) per query for k intervals on the section; k is small for
//! a single operating day.

/// Committed intervals and blocked windows of one section.
#[derive(Debug, Clone)]
pub(crate) struct SectionTimeline {
    capacity: usize,
    intervals: Vec<(i64, i64)>,
    blocks: Vec<(i64, i64)>,
}

impl SectionTimeline {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            intervals: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Forbids use of the section during `[start, end)`.
    pub(crate) fn block(&mut self, start_min: i64, end_min: i64) {
        if start_min < end_min {
            self.blocks.push((start_min, end_min));
        }
    }

    /// Commits `[start, end)`.
    pub(crate) fn insert(&mut self, start_min: i64, end_min: i64) {
        self.intervals.push((start_min, end_min));
    }

    /// Earliest start ≥ `from` at which a window of `duration` fits.
    pub(crate) fn earliest_fit(&self, from: i64, duration: i64) -> i64 {
        let mut candidates: Vec<i64> = self
            .intervals
            .iter()
            .chain(&self.blocks)
            .map(|&(_, end)| end)
            .filter(|&end| end > from)
            .collect();
        candidates.push(from);
        candidates.sort_unstable();
        candidates.dedup();

        // The last candidate is past every interval and block, so it always fits.
        let fallback = candidates.last().copied().unwrap_or(from);
        candidates
            .into_iter()
            .find(|&t| self.fits(t, t + duration))
            .unwrap_or(fallback)
    }

    /// Whether `[start, end)` respects blocks and capacity.
    pub(crate) fn fits(&self, start_min: i64, end_min: i64) -> bool {
        let blocked = self
            .blocks
            .iter()
            .any(|&(s, e)| start_min < e && s < end_min);
        !blocked && self.peak_load(start_min, end_min) < self.capacity
    }

    /// Maximum number of committed intervals active at once inside `[start, end)`.
    pub(crate) fn peak_load(&self, start_min: i64, end_min: i64) -> usize {
        let mut events: Vec<(i64, i32)> = Vec::new();
        for &(s, e) in &self.intervals {
            if s < end_min && start_min < e {
                events.push((s.max(start_min), 1));
                events.push((e.min(end_min), -1));
            }
        }
        // Ends sort before starts at the same instant (half-open intervals).
        events.sort_unstable();

        let mut load: i32 = 0;
        let mut peak: i32 = 0;
        for (_, delta) in events {
            load += delta;
            peak = peak.max(load);
        }
        peak.max(0) as usize
    }
}
