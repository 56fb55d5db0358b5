use core::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LocationGraph, LocationId};

/// Outcome of a single path query.
///
/// `systems` runs from origin to destination and `total_jumps` is the number of
/// connections traversed. A result with zero jumps and a single entry is the
/// "no route" sentinel (see [`PathResult::unreachable`]).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult {
    pub total_jumps: u32,
    pub systems: Vec<LocationId>,
}

impl PathResult {
    pub fn unreachable(origin: LocationId) -> Self {
        Self {
            total_jumps: 0,
            systems: vec![origin],
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.total_jumps == 0 && self.systems.len() <= 1
    }

    pub fn origin(&self) -> Option<LocationId> {
        self.systems.first().copied()
    }

    pub fn destination(&self) -> Option<LocationId> {
        self.systems.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cost: u32,
    tie: u64,
    id: LocationId,
}

impl OpenNode {
    fn key(&self) -> (u32, u64) {
        (self.cost, self.tie)
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable scratch buffers for [`PathSearch`] queries.
///
/// The pathfinding worker keeps one of these alive so repeated queries over the same
/// graph don't reallocate.
#[derive(Debug, Default)]
pub struct SearchScratch {
    open: BinaryHeap<OpenNode>,
    visited: Vec<bool>,
    next_hop: Vec<Option<LocationId>>,
}

impl SearchScratch {
    fn reset(&mut self, len: usize) {
        self.open.clear();
        self.visited.clear();
        self.visited.resize(len, false);
        self.next_hop.clear();
        self.next_hop.resize(len, None);
    }
}

/// Hop-count search over a shared [`LocationGraph`].
///
/// Every connection costs one jump. The open set is still a priority queue keyed by
/// accumulated cost (insertion order breaks ties), so weighted costs can be introduced
/// without restructuring the loop.
#[derive(Debug, Clone)]
pub struct PathSearch {
    graph: Arc<LocationGraph>,
}

impl PathSearch {
    pub fn new(graph: Arc<LocationGraph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Arc<LocationGraph> {
        &self.graph
    }

    pub fn find_path(&self, origin: LocationId, destination: LocationId) -> PathResult {
        let mut scratch = SearchScratch::default();
        self.find_path_with(origin, destination, &mut scratch)
    }

    /// Search from `destination` back towards `origin` along incoming connections.
    ///
    /// Walking backwards means each settled location records its next hop towards the
    /// destination, so the route can be read out origin-first with no reversal pass.
    /// The search seed (`destination`) is used even when blocked; every other location,
    /// `origin` included, must be unblocked to be entered.
    pub fn find_path_with(
        &self,
        origin: LocationId,
        destination: LocationId,
        scratch: &mut SearchScratch,
    ) -> PathResult {
        let graph = &*self.graph;
        if !graph.contains(origin) || !graph.contains(destination) {
            return PathResult::unreachable(origin);
        }
        if origin == destination {
            return PathResult::unreachable(origin);
        }

        scratch.reset(graph.len());
        scratch.visited[destination.index()] = true;
        scratch.open.push(OpenNode {
            cost: 0,
            tie: 0,
            id: destination,
        });
        let mut tie: u64 = 1;

        while let Some(node) = scratch.open.pop() {
            if node.id == origin {
                return Self::read_route(origin, &scratch.next_hop);
            }

            for &prev in graph.incoming(node.id) {
                let idx = prev.index();
                if scratch.visited[idx] || graph.is_blocked(prev) {
                    continue;
                }
                scratch.visited[idx] = true;
                scratch.next_hop[idx] = Some(node.id);
                scratch.open.push(OpenNode {
                    cost: node.cost.saturating_add(1),
                    tie,
                    id: prev,
                });
                tie += 1;
            }
        }

        PathResult::unreachable(origin)
    }

    fn read_route(origin: LocationId, next_hop: &[Option<LocationId>]) -> PathResult {
        let mut systems = vec![origin];
        let mut current = origin;
        while let Some(next) = next_hop[current.index()] {
            systems.push(next);
            current = next;
        }

        PathResult {
            total_jumps: (systems.len() - 1) as u32,
            systems,
        }
    }
}
