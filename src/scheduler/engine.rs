//! Priority-driven greedy scheduling engine with bounded repair.
//!
//! # Algorithm
//!
//! 1. Resolve every train's route and estimate per-section travel times.
//!    Trains without a usable route are excluded and reported.
//! 2. Reject the run as infeasible when any train's unconstrained span
//!    (release + Σ travel) cannot fit in the horizon.
//! 3. Order trains with the dispatching [`RuleEngine`] (priority score,
//!    then departure, then ID).
//! 4. Decode the order: each train walks its route, each segment taking
//!    the earliest start ≥ the previous segment's end at which the
//!    section's timeline admits it.
//! 5. Repair the order by swapping equal-score trains while the weighted
//!    completion objective `Σ completion × (K − score)` strictly drops.
//! 6. Re-check the horizon, then report status and metrics.
//!
//! # Complexity
//! One decode is O(S · k² log k) for S (train, section) pairs and k
//! intervals per section. Repair multiplies this by its iteration budget.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::cancel::{CancellationToken, StopCondition};
use super::repair::{self, Scored};
use super::timeline::SectionTimeline;
use crate::config::OptimizerConfig;
use crate::dispatching::RuleEngine;
use crate::error::ScheduleError;
use crate::models::{
    ExcludedTrain, Network, Schedule, ScheduleMetrics, ScheduledSegment, SectionBlock,
    SolveStatus, Train,
};
use crate::routing::{DirectAdjacency, RouteResolver};
use crate::travel_time;

const SCORE_EPSILON: f64 = 1e-9;

/// Input container for a solve.
#[derive(Debug, Clone, Default)]
pub struct OptimizationRequest {
    /// Trains to schedule.
    pub trains: Vec<Train>,
    /// Planning horizon (min). `None` = the engine's configured horizon.
    pub horizon_min: Option<i64>,
    /// Windows during which sections may not be used.
    pub blocks: Vec<SectionBlock>,
    /// Stops the repair phase early when triggered.
    pub cancel: Option<CancellationToken>,
}

impl OptimizationRequest {
    /// Creates a request for the given trains.
    pub fn new(trains: Vec<Train>) -> Self {
        Self {
            trains,
            ..Self::default()
        }
    }

    /// Sets the planning horizon.
    pub fn with_horizon(mut self, horizon_min: i64) -> Self {
        self.horizon_min = Some(horizon_min);
        self
    }

    /// Adds a section block.
    pub fn with_block(mut self, block: SectionBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Adds several section blocks.
    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = SectionBlock>) -> Self {
        self.blocks.extend(blocks);
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A train ready for placement.
#[derive(Debug)]
struct Job<'a> {
    train: &'a Train,
    route: Vec<String>,
    durations: Vec<i64>,
    release: i64,
    score: f64,
}

impl Job<'_> {
    /// Completion time with every section free.
    fn lower_bound_end(&self) -> i64 {
        self.release + self.durations.iter().sum::<i64>()
    }

    fn shares_section_with(&self, other: &Job<'_>) -> bool {
        self.route.iter().any(|s| other.route.contains(s))
    }
}

/// Decoded dispatch order: one window list per job.
#[derive(Debug, Clone)]
struct Placement {
    windows: Vec<Vec<(i64, i64)>>,
    waited: bool,
    objective: f64,
}

impl Scored for Placement {
    fn objective(&self) -> f64 {
        self.objective
    }
}

/// Greedy scheduling engine.
///
/// Deterministic: without a wall-clock limit, equal inputs give equal
/// schedules.
///
/// # Example
///
/// ```
/// use u_rail::models::{Network, Section, SectionKind, Train, TrainKind, TrainPriority};
/// use u_rail::scheduler::SchedulingEngine;
///
/// let network = Network::new("n")
///     .with_section(Section::new("A", SectionKind::DoubleLine, 10.0))
///     .with_section(Section::new("J1", SectionKind::Junction, 1.0))
///     .with_connection("A", "J1", None);
///
/// let trains = vec![
///     Train::new("HIGH", TrainKind::Express)
///         .with_priority(TrainPriority::High)
///         .with_route(["A", "J1"]),
///     Train::new("LOW", TrainKind::Local)
///         .with_priority(TrainPriority::Low)
///         .with_route(["A", "J1"]),
/// ];
///
/// let schedule = SchedulingEngine::default().optimize(&network, &trains, 240);
/// let high = schedule.segment("HIGH", "J1").unwrap();
/// let low = schedule.segment("LOW", "J1").unwrap();
/// assert!(high.start_min < low.start_min);
/// ```
#[derive(Debug, Clone)]
pub struct SchedulingEngine {
    config: OptimizerConfig,
    rules: RuleEngine,
    resolver: Arc<dyn RouteResolver>,
}

impl SchedulingEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            rules: RuleEngine::railway_default(),
            resolver: Arc::new(DirectAdjacency),
        }
    }

    /// Replaces the route resolution strategy.
    pub fn with_resolver<R: RouteResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replaces the dispatching rules.
    pub fn with_rule_engine(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Route resolution strategy in use.
    pub fn resolver(&self) -> &dyn RouteResolver {
        self.resolver.as_ref()
    }

    /// Schedules `trains` within `horizon_min`.
    pub fn optimize(&self, network: &Network, trains: &[Train], horizon_min: i64) -> Schedule {
        let request = OptimizationRequest::new(trains.to_vec()).with_horizon(horizon_min);
        self.solve(network, &request)
    }

    /// Solves a request.
    pub fn solve(&self, network: &Network, request: &OptimizationRequest) -> Schedule {
        let started = Instant::now();
        let total = request.trains.len();
        let horizon = request.horizon_min.unwrap_or(self.config.horizon_min);

        let (jobs, mut excluded) = self.prepare(network, &request.trains);

        let overruns = horizon_overruns(
            jobs.iter().map(|job| (job.train, job.lower_bound_end())),
            horizon,
        );
        if horizon <= 0 || !overruns.is_empty() {
            log::warn!(
                "infeasible horizon {horizon} min: {} train(s) cannot fit",
                overruns.len()
            );
            excluded.extend(overruns);
            return infeasible(total, excluded, started);
        }

        let order = self.rules.sort_indices(&jobs.iter().map(|j| j.train).collect::<Vec<_>>());
        let initial = self.decode(network, &jobs, &order, &request.blocks);

        let repair_cfg = &self.config.repair;
        let (placement, iterations, improvements) = if repair_cfg.enabled && jobs.len() > 1 {
            let stop = StopCondition::new(
                repair_cfg.max_iterations,
                repair_cfg.time_limit(),
                request.cancel.as_ref(),
            );
            let outcome = repair::improve(
                order,
                initial,
                |a, b| {
                    (jobs[a].score - jobs[b].score).abs() <= SCORE_EPSILON
                        && jobs[a].shares_section_with(&jobs[b])
                },
                |o| self.decode(network, &jobs, o, &request.blocks),
                &stop,
            );
            log::debug!(
                "repair kept {} improvement(s) in {} move(s); order {:?}",
                outcome.improvements,
                outcome.iterations,
                outcome
                    .order
                    .iter()
                    .map(|&idx| jobs[idx].train.id.as_str())
                    .collect::<Vec<_>>()
            );
            (outcome.best, outcome.iterations, outcome.improvements)
        } else {
            (initial, 0, 0)
        };

        let completion =
            |idx: usize| placement.windows[idx].last().map_or(jobs[idx].release, |w| w.1);
        let overruns = horizon_overruns(
            jobs.iter().enumerate().map(|(idx, job)| (job.train, completion(idx))),
            horizon,
        );
        if !overruns.is_empty() {
            log::warn!(
                "placement overruns horizon {horizon} min for {} train(s)",
                overruns.len()
            );
            excluded.extend(overruns);
            return infeasible(total, excluded, started);
        }

        let mut schedule = Schedule::new();
        let mut total_delay = 0i64;
        for (idx, job) in jobs.iter().enumerate() {
            for (section_id, &(start, end)) in job.route.iter().zip(&placement.windows[idx]) {
                schedule.add_segment(ScheduledSegment::new(&job.train.id, section_id, start, end));
            }
            total_delay += (completion(idx) - job.train.scheduled_arrival_min).max(0);
            log::debug!(
                "placed {} on {} section(s), completion {}",
                job.train.id,
                job.route.len(),
                completion(idx)
            );
        }

        schedule.status = if placement.waited {
            SolveStatus::Feasible
        } else {
            SolveStatus::Optimal
        };
        schedule.excluded = excluded;
        schedule.metrics = ScheduleMetrics {
            total_trains: total,
            scheduled_trains: jobs.len(),
            average_delay_min: if jobs.is_empty() {
                0.0
            } else {
                total_delay as f64 / jobs.len() as f64
            },
            weighted_completion: placement.objective,
            solve_time_ms: elapsed_ms(started),
            repair_iterations: iterations,
            repair_improvements: improvements,
        };

        log::info!(
            "solved {}/{} trains: {:?}, objective {:.1}, {} repair move(s) ({} kept)",
            schedule.metrics.scheduled_trains,
            total,
            schedule.status,
            schedule.metrics.weighted_completion,
            iterations,
            improvements
        );
        schedule
    }

    /// Resolves routes and travel times. Unusable trains are excluded.
    fn prepare<'a>(
        &self,
        network: &Network,
        trains: &'a [Train],
    ) -> (Vec<Job<'a>>, Vec<ExcludedTrain>) {
        let mut jobs = Vec::with_capacity(trains.len());
        let mut excluded = Vec::new();
        let mut seen = HashSet::new();

        for train in trains {
            if !seen.insert(train.id.as_str()) {
                let error = ScheduleError::DuplicateTrain {
                    train_id: train.id.clone(),
                };
                log::warn!("excluding train: {error}");
                excluded.push(ExcludedTrain {
                    train_id: train.id.clone(),
                    error,
                });
                continue;
            }
            let resolved = self
                .resolver
                .try_resolve(network, train)
                .and_then(|route| check_route(train, route));
            let route = match resolved {
                Ok(route) => route,
                Err(error) => {
                    log::warn!("excluding train: {error}");
                    excluded.push(ExcludedTrain {
                        train_id: train.id.clone(),
                        error,
                    });
                    continue;
                }
            };
            let durations = travel_time::estimate_route(network, train, &route);
            jobs.push(Job {
                train,
                route,
                durations,
                release: train.scheduled_departure_min.max(0),
                score: train.priority_score(),
            });
        }

        (jobs, excluded)
    }

    /// Places jobs in `order` and scores the result.
    fn decode(
        &self,
        network: &Network,
        jobs: &[Job<'_>],
        order: &[usize],
        blocks: &[SectionBlock],
    ) -> Placement {
        let mut timelines: HashMap<&str, SectionTimeline> = HashMap::new();
        for block in blocks {
            if let Some(section) = network.section(&block.section_id) {
                timelines
                    .entry(section.id.as_str())
                    .or_insert_with(|| SectionTimeline::new(section.capacity))
                    .block(block.start_min, block.end_min);
            }
        }

        let mut windows = vec![Vec::new(); jobs.len()];
        let mut waited = false;
        let mut objective = 0.0;

        for &idx in order {
            let job = &jobs[idx];
            let mut ready = job.release;
            let mut placed = Vec::with_capacity(job.route.len());

            for (section_id, &duration) in job.route.iter().zip(&job.durations) {
                let start = match network.section(section_id) {
                    Some(section) => {
                        let timeline = timelines
                            .entry(section.id.as_str())
                            .or_insert_with(|| SectionTimeline::new(section.capacity));
                        let start = timeline.earliest_fit(ready, duration);
                        timeline.insert(start, start + duration);
                        start
                    }
                    // Not in the topology: nothing to contend for.
                    None => ready,
                };
                waited |= start > ready;
                placed.push((start, start + duration));
                ready = start + duration;
            }

            objective += ready as f64 * (self.config.priority_ceiling - job.score);
            windows[idx] = placed;
        }

        Placement {
            windows,
            waited,
            objective,
        }
    }
}

impl Default for SchedulingEngine {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

/// Rejects routes with consecutive duplicate sections.
fn check_route(train: &Train, route: Vec<String>) -> Result<Vec<String>, ScheduleError> {
    match route.windows(2).find(|pair| pair[0] == pair[1]) {
        Some(pair) => Err(ScheduleError::InvalidRoute {
            train_id: train.id.clone(),
            reason: format!("section {} repeated consecutively", pair[0]),
        }),
        None => Ok(route),
    }
}

fn horizon_overruns<'t>(
    required_ends: impl IntoIterator<Item = (&'t Train, i64)>,
    horizon: i64,
) -> Vec<ExcludedTrain> {
    required_ends
        .into_iter()
        .filter(|&(_, required)| horizon <= 0 || required > horizon)
        .map(|(train, required)| ExcludedTrain {
            train_id: train.id.clone(),
            error: ScheduleError::InfeasibleHorizon {
                train_id: train.id.clone(),
                required,
                horizon,
            },
        })
        .collect()
}

fn infeasible(total: usize, excluded: Vec<ExcludedTrain>, started: Instant) -> Schedule {
    let mut schedule = Schedule::infeasible(total, excluded);
    schedule.metrics.solve_time_ms = elapsed_ms(started);
    schedule
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepairConfig;
    use crate::models::{Section, SectionKind, TrainKind, TrainPriority};
    use crate::routing::ShortestPath;

    // A (double line, 10 km) → J1 (junction, 1 km) → B (double line, 10 km)
    // At 100 km/h: A = 6 + 1 = 7, J1 = 0 + 3 = 3, B = 7.
    fn network() -> Network {
        Network::new("test")
            .with_section(Section::new("A", SectionKind::DoubleLine, 10.0).with_capacity(2))
            .with_section(Section::new("J1", SectionKind::Junction, 1.0))
            .with_section(Section::new("B", SectionKind::DoubleLine, 10.0).with_capacity(2))
            .with_connection("A", "J1", None)
            .with_connection("J1", "B", None)
    }

    fn train(id: &str, kind: TrainKind, priority: TrainPriority, departure: i64) -> Train {
        Train::new(id, kind)
            .with_priority(priority)
            .with_timing(departure, departure + 17)
            .with_route(["A", "J1", "B"])
    }

    #[test]
    fn test_single_train_is_optimal() {
        let t = train("T1", TrainKind::Local, TrainPriority::Medium, 5);
        let s = SchedulingEngine::default().optimize(&network(), &[t], 120);

        assert_eq!(s.status, SolveStatus::Optimal);
        let segs = s.segments_for_train("T1");
        let windows: Vec<(i64, i64)> = segs.iter().map(|g| (g.start_min, g.end_min)).collect();
        assert_eq!(windows, vec![(5, 12), (12, 15), (15, 22)]);
        assert_eq!(s.metrics.scheduled_trains, 1);
        assert!((s.metrics.average_delay_min - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_priority_claims_junction_first() {
        let trains = vec![
            train("LOW", TrainKind::Local, TrainPriority::Low, 0),
            train("HIGH", TrainKind::Local, TrainPriority::High, 0),
        ];
        let s = SchedulingEngine::default().optimize(&network(), &trains, 120);

        let high = s.segment("HIGH", "J1").unwrap();
        let low = s.segment("LOW", "J1").unwrap();
        assert_eq!((high.start_min, high.end_min), (7, 10));
        assert_eq!((low.start_min, low.end_min), (10, 13));
        assert_eq!(s.status, SolveStatus::Feasible);
        // LOW waits 3 min at J1 and arrives at 20 instead of 17
        assert_eq!(s.completion_time("LOW"), Some(20));
    }

    #[test]
    fn test_precedence_and_duration() {
        let trains: Vec<Train> = (0..4)
            .map(|i| train(&format!("T{i}"), TrainKind::Local, TrainPriority::Medium, i))
            .collect();
        let s = SchedulingEngine::default().optimize(&network(), &trains, 300);

        for t in &trains {
            let segs = s.segments_for_train(&t.id);
            assert_eq!(segs.len(), 3);
            assert!(segs[0].start_min >= t.scheduled_departure_min);
            for pair in segs.windows(2) {
                assert!(pair[1].start_min >= pair[0].end_min);
            }
        }
        // J1 has capacity 1: no overlaps
        let j1 = s.segments_for_section("J1");
        for pair in j1.windows(2) {
            assert!(pair[1].start_min >= pair[0].end_min);
        }
    }

    #[test]
    fn test_unresolvable_train_is_excluded() {
        let good = train("OK", TrainKind::Local, TrainPriority::Medium, 0);
        let lost = Train::new("LOST", TrainKind::Local).with_endpoints("A", "B");
        let s = SchedulingEngine::default().optimize(&network(), &[good, lost], 120);

        assert!(s.is_feasible());
        assert!(s.is_excluded("LOST"));
        assert!(matches!(
            s.excluded[0].error,
            ScheduleError::UnresolvableRoute { .. }
        ));
        assert_eq!(s.metrics.total_trains, 2);
        assert_eq!(s.metrics.scheduled_trains, 1);
    }

    #[test]
    fn test_shortest_path_resolver_routes_train() {
        let lost = Train::new("T", TrainKind::Local).with_endpoints("A", "B");
        let engine = SchedulingEngine::default().with_resolver(ShortestPath);
        let s = engine.optimize(&network(), &[lost], 120);
        assert_eq!(s.segments_for_train("T").len(), 3);
    }

    #[test]
    fn test_duplicate_train_id_is_excluded() {
        let trains = vec![
            Train::new("T", TrainKind::Local).with_route(["A", "J1"]),
            Train::new("T", TrainKind::Freight).with_route(["A", "J1"]),
        ];
        let s = SchedulingEngine::default().optimize(&network(), &trains, 120);

        let windows: Vec<(&str, i64, i64)> = s
            .segments_for_train("T")
            .iter()
            .map(|g| (g.section_id.as_str(), g.start_min, g.end_min))
            .collect();
        assert_eq!(windows, vec![("A", 0, 7), ("J1", 7, 10)]);
        assert_eq!(s.excluded.len(), 1);
        assert_eq!(
            s.excluded[0].error,
            ScheduleError::DuplicateTrain { train_id: "T".into() }
        );
        assert_eq!(s.metrics.total_trains, 2);
        assert_eq!(s.metrics.scheduled_trains, 1);
        assert!(crate::validation::verify_schedule(&network(), &s, &trains).is_ok());
    }

    #[test]
    fn test_invalid_route_is_excluded() {
        let t = Train::new("T", TrainKind::Local).with_route(["A", "A", "J1"]);
        let s = SchedulingEngine::default().optimize(&network(), &[t], 120);
        assert!(matches!(
            s.excluded[0].error,
            ScheduleError::InvalidRoute { .. }
        ));
    }

    #[test]
    fn test_horizon_too_short() {
        let t = train("T1", TrainKind::Local, TrainPriority::Medium, 0);
        let s = SchedulingEngine::default().optimize(&network(), &[t.clone()], 10);

        assert_eq!(s.status, SolveStatus::Infeasible);
        assert_eq!(s.segment_count(), 0);
        assert_eq!(
            s.excluded[0].error,
            ScheduleError::InfeasibleHorizon {
                train_id: "T1".into(),
                required: 17,
                horizon: 10,
            }
        );

        let s = SchedulingEngine::default().optimize(&network(), &[t], 0);
        assert_eq!(s.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_horizon_overrun_after_waiting() {
        // Each fits alone (17 min), but the second waits 3 min at J1.
        let trains = vec![
            train("T1", TrainKind::Local, TrainPriority::High, 0),
            train("T2", TrainKind::Local, TrainPriority::Low, 0),
        ];
        let s = SchedulingEngine::default().optimize(&network(), &trains, 18);
        assert_eq!(s.status, SolveStatus::Infeasible);
        assert!(s.is_excluded("T2"));
        assert!(!s.is_excluded("T1"));
    }

    #[test]
    fn test_block_delays_train() {
        let t = train("T1", TrainKind::Local, TrainPriority::Medium, 0);
        let request = OptimizationRequest::new(vec![t])
            .with_horizon(120)
            .with_block(SectionBlock::new("J1", 5, 30));
        let s = SchedulingEngine::default().solve(&network(), &request);

        let j1 = s.segment("T1", "J1").unwrap();
        assert_eq!(j1.start_min, 30);
        assert_eq!(s.status, SolveStatus::Feasible);
    }

    #[test]
    fn test_unknown_section_is_unconstrained() {
        let trains = vec![
            Train::new("T1", TrainKind::Local).with_route(["X"]),
            Train::new("T2", TrainKind::Local).with_route(["X"]),
        ];
        let s = SchedulingEngine::default().optimize(&network(), &trains, 60);
        assert_eq!(s.segment("T1", "X").unwrap().start_min, 0);
        assert_eq!(s.segment("T2", "X").unwrap().start_min, 0);
        assert_eq!(s.segment("T2", "X").unwrap().duration_min(), travel_time::DEFAULT_TRAVEL_MIN);
    }

    #[test]
    fn test_repair_keeps_order_without_strict_gain() {
        let trains = vec![
            train("T1", TrainKind::Local, TrainPriority::Medium, 0),
            train("T2", TrainKind::Local, TrainPriority::Medium, 0),
        ];
        let engine = SchedulingEngine::default();
        let s = engine.optimize(&network(), &trains, 120);
        assert!(s.metrics.repair_iterations >= 1);
        // Symmetric instance: no strict improvement exists.
        assert_eq!(s.metrics.repair_improvements, 0);
        assert_eq!(s.segment("T1", "J1").unwrap().start_min, 7);
    }

    #[test]
    fn test_repair_disabled() {
        let trains = vec![
            train("T1", TrainKind::Local, TrainPriority::Medium, 0),
            train("T2", TrainKind::Local, TrainPriority::Medium, 0),
        ];
        let config = OptimizerConfig::default().with_repair(RepairConfig::disabled());
        let s = SchedulingEngine::new(config).optimize(&network(), &trains, 120);
        assert_eq!(s.metrics.repair_iterations, 0);
    }

    #[test]
    fn test_cancelled_request_still_returns_schedule() {
        let token = CancellationToken::new();
        token.cancel();
        let trains = vec![
            train("T1", TrainKind::Local, TrainPriority::Medium, 0),
            train("T2", TrainKind::Local, TrainPriority::Medium, 0),
        ];
        let request = OptimizationRequest::new(trains)
            .with_horizon(120)
            .with_cancellation(token);
        let s = SchedulingEngine::default().solve(&network(), &request);
        assert!(s.is_feasible());
        assert_eq!(s.metrics.repair_iterations, 0);
        assert_eq!(s.segment_count(), 6);
    }

    #[test]
    fn test_deterministic() {
        let trains: Vec<Train> = (0..6)
            .map(|i| train(&format!("T{i}"), TrainKind::Freight, TrainPriority::Medium, i % 3))
            .collect();
        let engine = SchedulingEngine::default();
        let a = engine.optimize(&network(), &trains, 500);
        let b = engine.optimize(&network(), &trains, 500);
        assert_eq!(a.trains, b.trains);
        assert_eq!(a.status, b.status);
    }

    #[test]
    fn test_empty_input() {
        let s = SchedulingEngine::default().optimize(&network(), &[], 60);
        assert_eq!(s.status, SolveStatus::Optimal);
        assert_eq!(s.segment_count(), 0);
        assert_eq!(s.metrics.total_trains, 0);
    }

    #[test]
    fn test_objective_uses_priority_ceiling() {
        let t = train("T1", TrainKind::Local, TrainPriority::Medium, 0);
        let s = SchedulingEngine::default().optimize(&network(), &[t], 120);
        // completion 17 × (10 − 2)
        assert!((s.metrics.weighted_completion - 136.0).abs() < 1e-10);
    }
}
