// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! One run of the priority search.

use crate::distance::Distance;
use crate::generation::Generation;
use crate::stop::StopCriterion;
use arg::hashmap::{HashMap, HashSet};
use arg::{Analysis, NodeId};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A waitlist entry. The weight is fixed when the entry is pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Edge {
    node: NodeId,
    depth: u32,
    weight: u32,
    reaches_target: bool,
    small_heuristic: bool,
    seq: u64,
}

impl Edge {
    fn key(&self) -> (Reverse<u32>, bool, bool, Reverse<u64>) {
        (
            Reverse(self.weight),
            self.reaches_target,
            self.small_heuristic,
            Reverse(self.seq),
        )
    }
}

// BinaryHeap is a max-heap, so the "largest" edge is the one to pop.
impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// State of a single distance search: the waitlist ordered by
/// `f = depth + heuristic` (or `depth + distance` once known), the finished
/// nodes, the best depth and search parent of every node seen, and the
/// nodes reaching a target in the order they were popped.
///
/// Ties on `f` prefer nodes reaching a target, then nodes with heuristic 0
/// or 1, then insertion order.
#[derive(Debug)]
pub struct AstarSearch {
    start_nodes: Vec<NodeId>,
    stop: StopCriterion,
    waitlist: BinaryHeap<Edge>,
    done: HashSet<NodeId>,
    depths: HashMap<NodeId, u32>,
    parents: HashMap<NodeId, Option<NodeId>>,
    reached: Vec<NodeId>,
    seq: u64,
}

impl AstarSearch {
    pub fn new(start_nodes: Vec<NodeId>, stop: StopCriterion) -> Self {
        AstarSearch {
            start_nodes,
            stop,
            waitlist: BinaryHeap::new(),
            done: HashSet::default(),
            depths: HashMap::default(),
            parents: HashMap::default(),
            reached: vec![],
            seq: 0,
        }
    }

    pub fn start_nodes(&self) -> &[NodeId] {
        &self.start_nodes
    }

    /// Nodes reaching a target, in non-decreasing order of
    /// [`AstarSearch::distance_until_target`].
    pub fn reached(&self) -> &[NodeId] {
        &self.reached
    }

    /// The node `node` was reached from, `None` for start nodes and nodes
    /// never reached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied().flatten()
    }

    pub(crate) fn remove_parent(&mut self, node: NodeId) {
        self.parents.shift_remove(&node);
    }

    pub fn depth(&self, node: NodeId) -> Option<u32> {
        self.depths.get(&node).copied()
    }

    /// Enqueue `node`, whose heuristic must already be known.
    ///
    /// Nodes with infinite heuristic or distance are dropped. A node already
    /// seen at a depth no larger than `depth` is left alone.
    pub fn add_to_waitlist<A: Analysis>(
        &mut self,
        gen: &Generation<A>,
        node: NodeId,
        parent: Option<NodeId>,
        depth: u32,
    ) {
        let search_node = gen.search_node(node);
        let heuristic = search_node.heuristic();
        let distance = search_node.distance();
        assert!(
            heuristic.is_known(),
            "{node} must have a heuristic before entering the waitlist"
        );
        if heuristic.is_infinite() || distance.is_infinite() {
            return;
        }

        if self.done.contains(&node) {
            let old = self.depths[&node];
            assert!(
                old <= depth,
                "{node} was finished at depth {old} but is reachable at depth {depth}"
            );
            return;
        }
        if let Some(&old) = self.depths.get(&node) {
            if old <= depth {
                return;
            }
        }
        self.depths.insert(node, depth);
        self.parents.insert(node, parent);

        let estimate = if distance.is_finite() {
            distance
        } else {
            heuristic
        };
        let edge = Edge {
            node,
            depth,
            weight: (estimate + depth).value(),
            reaches_target: Self::reaches_target(gen, node),
            small_heuristic: heuristic <= Distance::Finite(1),
            seq: self.seq,
        };
        self.seq += 1;
        log::trace!("waitlist <- {node} depth {depth} f {}", edge.weight);
        self.waitlist.push(edge);
    }

    /// Pop the next node to visit.
    ///
    /// Nodes reaching a target are recorded in [`AstarSearch::reached`]; they
    /// are only handed out when `return_reached` is set. Returns `None` once
    /// the waitlist is empty, or once the stop criterion holds and the next
    /// node does not reach a target.
    pub fn remove_from_waitlist<A: Analysis>(
        &mut self,
        gen: &Generation<A>,
        return_reached: bool,
    ) -> Option<(NodeId, u32)> {
        while let Some(&edge) = self.waitlist.peek() {
            if self.stop.can_stop(&gen.arg, &self.reached) && !Self::reaches_target(gen, edge.node)
            {
                break;
            }
            self.waitlist.pop();
            if !self.done.insert(edge.node) {
                continue;
            }
            if Self::reaches_target(gen, edge.node) {
                self.reached.push(edge.node);
                if !return_reached {
                    continue;
                }
            }
            return Some((edge.node, edge.depth));
        }
        None
    }

    /// A target, or a node with known finite distance.
    pub fn reaches_target<A: Analysis>(gen: &Generation<A>, node: NodeId) -> bool {
        gen.arg.is_target(node) || gen.distance(node).is_finite()
    }

    /// Length of the path through `node` from the start nodes to the
    /// nearest target below it.
    pub fn distance_until_target<A: Analysis>(&self, gen: &Generation<A>, node: NodeId) -> u32 {
        let depth = self.depths[&node];
        if gen.arg.is_target(node) {
            depth
        } else {
            depth + gen.distance(node).value()
        }
    }
}
