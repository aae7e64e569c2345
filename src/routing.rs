//! Route resolution.
//!
//! Turns a train into the ordered list of sections it must traverse.
//! An explicit route on the train always wins; otherwise a
//! [`RouteResolver`] strategy derives one from origin and destination.
//!
//! An empty result means "no route": callers exclude the train from
//! scheduling and report it, they never treat it as fatal.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;

use crate::error::{Result, ScheduleError};
use crate::models::{Network, Train};

/// Strategy for deriving a route from origin and destination.
pub trait RouteResolver: Send + Sync + Debug {
    /// Strategy name.
    fn name(&self) -> &'static str;

    /// Finds a path from `origin` to `destination`, inclusive.
    fn find_path(&self, network: &Network, origin: &str, destination: &str) -> Option<Vec<String>>;

    /// Resolves a train's route.
    fn try_resolve(&self, network: &Network, train: &Train) -> Result<Vec<String>> {
        if train.has_explicit_route() {
            return Ok(train.route.clone());
        }
        self.find_path(network, &train.origin, &train.destination)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| ScheduleError::UnresolvableRoute {
                train_id: train.id.clone(),
                origin: train.origin.clone(),
                destination: train.destination.clone(),
            })
    }

    /// Resolves a train's route; empty when none exists.
    fn resolve(&self, network: &Network, train: &Train) -> Vec<String> {
        self.try_resolve(network, train).unwrap_or_else(|e| {
            log::debug!("{}: {e}", self.name());
            Vec::new()
        })
    }
}

/// Direct adjacency only: `[origin]` when origin equals destination,
/// `[origin, destination]` when they are adjacent, nothing otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAdjacency;

impl RouteResolver for DirectAdjacency {
    fn name(&self) -> &'static str {
        "DirectAdjacency"
    }

    fn find_path(&self, network: &Network, origin: &str, destination: &str) -> Option<Vec<String>> {
        if origin.is_empty() || destination.is_empty() {
            return None;
        }
        if origin == destination {
            return Some(vec![origin.to_string()]);
        }
        network
            .connected(origin, destination)
            .then(|| vec![origin.to_string(), destination.to_string()])
    }
}

/// Fewest-sections path by breadth-first search over adjacency.
///
/// Neighbours are expanded in their recorded order, so equal-length
/// alternatives always resolve the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPath;

impl RouteResolver for ShortestPath {
    fn name(&self) -> &'static str {
        "ShortestPath"
    }

    fn find_path(&self, network: &Network, origin: &str, destination: &str) -> Option<Vec<String>> {
        network.section(origin)?;
        network.section(destination)?;
        if origin == destination {
            return Some(vec![origin.to_string()]);
        }

        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        parent.insert(origin, origin);
        queue.push_back(origin);

        while let Some(current) = queue.pop_front() {
            let Some(section) = network.section(current) else {
                continue;
            };
            for next in &section.connected {
                let next = next.as_str();
                if parent.contains_key(next) || network.section(next).is_none() {
                    continue;
                }
                parent.insert(next, current);
                if next == destination {
                    return Some(unwind(&parent, origin, destination));
                }
                queue.push_back(next);
            }
        }

        log::debug!("NoPathFound: {origin} => {destination}");
        None
    }
}

fn unwind(parent: &HashMap<&str, &str>, origin: &str, destination: &str) -> Vec<String> {
    let mut path = vec![destination.to_string()];
    let mut current = destination;
    while current != origin {
        current = parent[current];
        path.push(current.to_string());
    }
    path.reverse();
    path
}
