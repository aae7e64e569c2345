//! Cooperative cancellation for long-running solves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A shared stop flag.
///
/// Clones observe the same flag. The engine polls it at iteration
/// boundaries and returns the best complete schedule found so far.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Stop condition for the repair loop: iteration budget, optional
/// wall-clock limit and optional token.
#[derive(Debug)]
pub(crate) struct StopCondition<'a> {
    started: Instant,
    time_limit: Option<Duration>,
    max_iterations: usize,
    token: Option<&'a CancellationToken>,
}

impl<'a> StopCondition<'a> {
    pub(crate) fn new(
        max_iterations: usize,
        time_limit: Option<Duration>,
        token: Option<&'a CancellationToken>,
    ) -> Self {
        Self {
            started: Instant::now(),
            time_limit,
            max_iterations,
            token,
        }
    }

    /// Returns the reason to stop after `iterations` moves, if any.
    pub(crate) fn check(&self, iterations: usize) -> Option<&'static str> {
        if iterations >= self.max_iterations {
            return Some("iteration budget exhausted");
        }
        if self.token.is_some_and(CancellationToken::is_cancelled) {
            return Some("cancelled");
        }
        match self.time_limit {
            Some(limit) if self.started.elapsed() >= limit => Some("time limit exceeded"),
            _ => None,
        }
    }
}
