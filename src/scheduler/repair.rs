//! Bounded local-search repair of the greedy dispatch order.
//!
//! # Algorithm
//!
//! Greedy descent over pairwise swaps in the dispatch order. A move is
//! admissible only for trains with equal priority score that share a
//! section, so the priority order of the greedy pass is never inverted.
//! Each move re-decodes the whole order; it is kept only when the
//! objective strictly decreases. The pass repeats until a full sweep
//! finds no improvement or the stop condition fires.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 14: Local Search

use super::cancel::StopCondition;

const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Something the repair loop can score.
pub(crate) trait Scored {
    fn objective(&self) -> f64;
}

/// Result of a repair run.
#[derive(Debug)]
pub(crate) struct RepairOutcome<P> {
    pub order: Vec<usize>,
    pub best: P,
    pub iterations: usize,
    pub improvements: usize,
}

/// Improves `order` by admissible swaps.
///
/// `can_swap(a, b)` receives job indices; `decode` maps an order to a
/// scored placement.
pub(crate) fn improve<P, S, D>(
    mut order: Vec<usize>,
    mut best: P,
    can_swap: S,
    mut decode: D,
    stop: &StopCondition<'_>,
) -> RepairOutcome<P>
where
    P: Scored,
    S: Fn(usize, usize) -> bool,
    D: FnMut(&[usize]) -> P,
{
    let mut iterations = 0;
    let mut improvements = 0;

    'descent: loop {
        let mut improved = false;
        for i in 0..order.len() {
            for j in (i + 1)..order.len() {
                if !can_swap(order[i], order[j]) {
                    continue;
                }
                if let Some(reason) = stop.check(iterations) {
                    log::debug!("repair stopped after {iterations} moves: {reason}");
                    break 'descent;
                }
                iterations += 1;

                order.swap(i, j);
                let candidate = decode(&order);
                if candidate.objective() < best.objective() - IMPROVEMENT_EPSILON {
                    best = candidate;
                    improvements += 1;
                    improved = true;
                } else {
                    order.swap(i, j);
                }
            }
        }
        if !improved {
            break;
        }
    }

    RepairOutcome {
        order,
        best,
        iterations,
        improvements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::CancellationToken;

    struct Cost(f64);

    impl Scored for Cost {
        fn objective(&self) -> f64 {
            self.0
        }
    }

    // Cost of an order: Σ position × weight, minimized by heaviest first.
    fn weighted(order: &[usize], weights: &[f64]) -> Cost {
        Cost(
            order
                .iter()
                .enumerate()
                .map(|(pos, &job)| (pos + 1) as f64 * weights[job])
                .sum(),
        )
    }

    #[test]
    fn test_descent_reaches_local_optimum() {
        let weights = [1.0, 2.0, 3.0];
        let order = vec![0, 1, 2];
        let start = weighted(&order, &weights);
        let stop = StopCondition::new(100, None, None);

        let out = improve(order, start, |_, _| true, |o| weighted(o, &weights), &stop);
        assert_eq!(out.order, vec![2, 1, 0]);
        assert!((out.best.0 - 10.0).abs() < 1e-10);
        assert!(out.improvements >= 1);
    }

    #[test]
    fn test_inadmissible_moves_are_skipped() {
        let weights = [1.0, 2.0];
        let stop = StopCondition::new(100, None, None);
        let out = improve(
            vec![0, 1],
            weighted(&[0, 1], &weights),
            |_, _| false,
            |o| weighted(o, &weights),
            &stop,
        );
        assert_eq!(out.order, vec![0, 1]);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn test_budget_bounds_iterations() {
        let weights = [1.0, 2.0, 3.0, 4.0];
        let stop = StopCondition::new(2, None, None);
        let out = improve(
            vec![0, 1, 2, 3],
            weighted(&[0, 1, 2, 3], &weights),
            |_, _| true,
            |o| weighted(o, &weights),
            &stop,
        );
        assert_eq!(out.iterations, 2);
    }

    #[test]
    fn test_cancelled_token_keeps_initial() {
        let token = CancellationToken::new();
        token.cancel();
        let weights = [1.0, 2.0];
        let stop = StopCondition::new(100, None, Some(&token));
        let out = improve(
            vec![0, 1],
            weighted(&[0, 1], &weights),
            |_, _| true,
            |o| weighted(o, &weights),
            &stop,
        );
        assert_eq!(out.order, vec![0, 1]);
        assert_eq!(out.iterations, 0);
    }
}
