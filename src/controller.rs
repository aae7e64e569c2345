//! Thread-safe entry points over a shared network.
//!
//! # Locking
//!
//! - The network sits behind an `RwLock`: route resolution, optimization
//!   and conflict checks share the read lock; section reservation,
//!   occupation and release take the write lock, so the three mutations
//!   are atomic with respect to each other.
//! - Re-optimization is serialized on the optimizer `Mutex`. Before
//!   queueing, a caller cancels the token of the solve in flight so a newer
//!   disruption batch supersedes a stale one.
//! - A poisoned lock is recovered: no operation here leaves the guarded
//!   state half-mutated.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::conflict;
use crate::models::{Conflict, Disruption, Network, Resolution, Schedule, Train};
use crate::realtime::{RealTimeOptimizer, ReoptimizationOutcome};
use crate::routing::RouteResolver;
use crate::scheduler::{CancellationToken, SchedulingEngine};

/// Facade for the transport layer.
///
/// # Example
///
/// ```
/// use u_rail::controller::TrafficController;
/// use u_rail::models::{Network, Section, SectionKind};
/// use u_rail::scheduler::SchedulingEngine;
///
/// let network = Network::new("n").with_section(Section::new("P1", SectionKind::Platform, 0.4));
/// let controller = TrafficController::new(network, SchedulingEngine::default());
///
/// assert!(controller.occupy_section("P1", "T1"));
/// assert!(!controller.capacity_available("P1"));
/// assert!(controller.release_section("P1", "T1"));
/// assert!(!controller.release_section("P1", "T1"));
/// ```
#[derive(Debug)]
pub struct TrafficController {
    network: RwLock<Network>,
    engine: SchedulingEngine,
    optimizer: Mutex<RealTimeOptimizer>,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl TrafficController {
    /// Creates a controller owning `network`.
    pub fn new(network: Network, engine: SchedulingEngine) -> Self {
        Self {
            network: RwLock::new(network),
            optimizer: Mutex::new(RealTimeOptimizer::new(engine.clone())),
            engine,
            in_flight: Mutex::new(None),
        }
    }

    /// The scheduling engine.
    pub fn engine(&self) -> &SchedulingEngine {
        &self.engine
    }

    fn resolver(&self) -> &dyn RouteResolver {
        self.engine.resolver()
    }

    /// Runs `f` against a read-only view of the network.
    pub fn with_network<R>(&self, f: impl FnOnce(&Network) -> R) -> R {
        f(&*self.read())
    }

    /// Ordered sections of a train's route; empty when none exists.
    pub fn resolve_route(&self, train: &Train) -> Vec<String> {
        self.resolver().resolve(&self.read(), train)
    }

    /// Schedules `trains` within `horizon_min`.
    pub fn optimize(&self, trains: &[Train], horizon_min: i64) -> Schedule {
        self.engine.optimize(&self.read(), trains, horizon_min)
    }

    /// Structural capacity conflicts among `trains`.
    pub fn detect_conflicts(&self, trains: &[Train]) -> Vec<Conflict> {
        conflict::detect(&self.read(), self.resolver(), trains)
    }

    /// Overlap conflicts in a committed schedule.
    pub fn detect_schedule_conflicts(&self, schedule: &Schedule) -> Vec<Conflict> {
        conflict::detect_in_schedule(&self.read(), schedule)
    }

    /// Recommended actions for `conflicts`.
    pub fn resolve_conflicts(&self, conflicts: &[Conflict], trains: &[Train]) -> Vec<Resolution> {
        conflict::resolve(&self.read(), self.resolver(), conflicts, trains)
    }

    /// Applies disruptions and re-optimizes.
    ///
    /// Cancels any re-optimization still running, then waits for the
    /// optimizer. The returned outcome always carries a schedule.
    pub fn apply_disruptions_and_reoptimize(
        &self,
        trains: &[Train],
        disruptions: &[Disruption],
    ) -> ReoptimizationOutcome {
        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.in_flight).replace(token.clone()) {
            previous.cancel();
        }

        let mut optimizer = lock(&self.optimizer);
        let network = self.read();
        optimizer.update(&network, trains, disruptions, Some(token))
    }

    /// The schedule retained by the last re-optimization.
    pub fn current_schedule(&self) -> Option<Schedule> {
        lock(&self.optimizer).current_schedule().cloned()
    }

    /// Drops retained section blocks.
    pub fn clear_blocks(&self) {
        lock(&self.optimizer).clear_blocks();
    }

    /// Reserves a section for a train.
    pub fn reserve_section(&self, section_id: &str, train_id: &str) -> bool {
        self.write().reserve(section_id, train_id)
    }

    /// Moves a train into a section.
    pub fn occupy_section(&self, section_id: &str, train_id: &str) -> bool {
        self.write().occupy(section_id, train_id)
    }

    /// Removes a train from a section.
    pub fn release_section(&self, section_id: &str, train_id: &str) -> bool {
        self.write().release(section_id, train_id)
    }

    /// Whether a section can take another train.
    pub fn capacity_available(&self, section_id: &str) -> bool {
        self.read().capacity_available(section_id)
    }

    fn read(&self) -> RwLockReadGuard<'_, Network> {
        self.network.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Network> {
        self.network.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
