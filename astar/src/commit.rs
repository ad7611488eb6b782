// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Turning a finished search into distances.

use crate::distance::Distance;
use crate::generation::Generation;
use crate::search::AstarSearch;
use arg::hashmap::HashSet;
use arg::{Analysis, NodeId};
use itertools::Itertools;
use std::collections::VecDeque;

/// Commit a goal-directed search: distances along the paths to the reached
/// nodes, then whatever follows from them.
pub(crate) fn commit_partial<A: Analysis>(gen: &mut Generation<A>, search: &AstarSearch) {
    let reached = search.reached();
    if reached.is_empty() {
        propagate_down_infinite(gen, search.start_nodes());
        return;
    }

    for (&a, &b) in reached.iter().tuple_windows() {
        assert!(
            search.distance_until_target(gen, a) <= search.distance_until_target(gen, b),
            "{a} was reached before {b} but lies on a longer path"
        );
    }
    for &node in reached {
        if gen.arg.is_target(node) {
            gen.set_distance(node, Distance::ZERO);
        }
    }
    for &node in reached {
        propagate_up_finite(gen, search, node);
    }
    propagate_up_from_infinite(gen);
}

/// Commit an exhaustive search: exact distances by backward breadth-first
/// search from every target, then everything else is unreachable.
pub(crate) fn commit_full<A: Analysis>(gen: &mut Generation<A>, search: &AstarSearch) {
    for &node in search.reached() {
        assert!(
            gen.arg.is_target(node),
            "full search reached non-target {node}"
        );
    }

    let mut queue: VecDeque<(NodeId, u32)> = gen
        .arg
        .nodes()
        .filter(|n| n.is_target())
        .map(|n| (n.id(), 0))
        .collect();
    // 0-1 breadth-first search: covering edges are free
    while let Some((node, distance)) = queue.pop_front() {
        if gen.distance(node).is_known() {
            continue;
        }
        gen.set_distance(node, Distance::Finite(distance));
        for &covered in gen.arg.covered_nodes(node) {
            queue.push_front((covered, distance));
        }
        if let Some(parent) = gen.arg.parent(node) {
            queue.push_back((parent, distance + 1));
        }
    }

    let unknown: Vec<NodeId> = gen
        .arg
        .node_ids()
        .filter(|&n| !gen.distance(n).is_known())
        .collect();
    for node in unknown {
        gen.set_distance(node, Distance::Infinite);
    }
}

/// Walk the search parents up from `from`, assigning the distance of the
/// path found to `from`.
fn propagate_up_finite<A: Analysis>(gen: &mut Generation<A>, search: &AstarSearch, from: NodeId) {
    let mut distance = gen.distance(from);
    assert!(distance.is_finite(), "reached node {from} has no distance");
    let mut conditional = vec![];
    let mut node = from;
    loop {
        let parent = search.parent(node);
        if node != from {
            assert!(
                !gen.arg.is_target(node),
                "target {node} lies on the path to {from}"
            );
            let known = gen.distance(node);
            if known.is_known() {
                assert!(
                    known <= distance,
                    "{node} has distance {known} but a path to {from} of length {distance}"
                );
                break;
            }
            // a later reached node does not lie on a shortest path
            if gen.arg.is_expanded(node)
                && gen
                    .arg
                    .succ_nodes(node)
                    .iter()
                    .any(|&s| gen.distance(s).is_finite() && gen.distance(s).succ() < distance)
            {
                break;
            }
            gen.set_distance(node, distance);
        }

        conditional.extend(
            gen.arg
                .covered_nodes(node)
                .iter()
                .copied()
                .filter(|&c| Some(c) != parent),
        );
        if let Some(tree_parent) = gen.arg.parent(node) {
            if Some(tree_parent) != parent {
                conditional.push(tree_parent);
            }
        }

        if search.start_nodes().contains(&node) {
            break;
        }
        let Some(parent) = parent else {
            break;
        };
        if gen.arg.covering_node(parent) == Some(node) {
            assert!(
                gen.arg.covered_nodes(node).contains(&parent),
                "covering edge {parent} -> {node} is one-sided"
            );
        } else {
            assert_eq!(
                gen.arg.parent(node),
                Some(parent),
                "search parent of {node} is neither its tree parent nor covered by it"
            );
            distance = distance.succ();
        }
        node = parent;
    }
    propagate_up_conditional(gen, conditional);
}

/// Nothing reachable from `start` reaches a target.
fn propagate_down_infinite<A: Analysis>(gen: &mut Generation<A>, start: &[NodeId]) {
    let mut visited = HashSet::default();
    let mut queue: VecDeque<NodeId> = start.iter().copied().collect();
    let mut conditional = vec![];
    while let Some(node) = queue.pop_front() {
        if !visited.insert(node) {
            continue;
        }
        let known = gen.distance(node);
        if known.is_known() {
            assert!(
                known.is_infinite(),
                "{node} is below an unreachable start node but has distance {known}"
            );
            continue;
        }
        assert!(
            !gen.arg.is_target(node),
            "target {node} found below an unreachable start node"
        );
        conditional.extend(
            gen.arg
                .covered_nodes(node)
                .iter()
                .copied()
                .filter(|&c| !gen.distance(c).is_known()),
        );
        gen.set_distance(node, Distance::Infinite);

        if gen.heuristic(node).is_infinite() {
            continue;
        }
        if let Some(coverer) = gen.arg.covering_node(node) {
            queue.push_back(coverer);
        } else if gen.arg.is_expanded(node) {
            queue.extend(gen.arg.succ_nodes(node));
        } else {
            assert!(
                !gen.arg.is_feasible(node),
                "{node} was left unexplored by an exhaustive search"
            );
        }
    }
    propagate_up_conditional(gen, conditional);
}

/// Mark the structurally dead nodes Infinite and propagate upwards.
fn propagate_up_from_infinite<A: Analysis>(gen: &mut Generation<A>) {
    let dead: Vec<NodeId> = gen
        .arg
        .nodes()
        .filter(|n| !n.is_target() && !gen.distance(n.id()).is_known())
        .filter(|n| match n.covering() {
            Some(coverer) => gen.distance(coverer).is_infinite(),
            None if n.is_expanded() => n.is_leaf(),
            None => gen.heuristic(n.id()).is_infinite() || !n.is_feasible(),
        })
        .map(|n| n.id())
        .collect();
    propagate_up_conditional(gen, dead);
}

/// Assign the distances that follow from already known ones, starting at
/// `nodes` and moving up the tree and backwards along covering edges.
fn propagate_up_conditional<A: Analysis>(gen: &mut Generation<A>, nodes: Vec<NodeId>) {
    let mut queue: VecDeque<NodeId> = nodes.into();
    while let Some(start) = queue.pop_front() {
        let mut node = start;
        loop {
            if gen.arg.is_target(node) || gen.distance(node).is_known() {
                break;
            }
            let distance = if let Some(coverer) = gen.arg.covering_node(node) {
                gen.distance(coverer)
            } else if gen.arg.is_leaf(node) {
                let dead = gen.arg.is_expanded(node)
                    || !gen.arg.is_feasible(node)
                    || gen.heuristic(node).is_infinite();
                if dead {
                    Distance::Infinite
                } else {
                    Distance::Unknown
                }
            } else if !gen.arg.is_expanded(node) {
                Distance::Unknown
            } else {
                let succs = gen.arg.succ_nodes(node);
                if succs.iter().all(|&s| gen.distance(s).is_known()) {
                    succs
                        .iter()
                        .map(|&s| gen.distance(s))
                        .min()
                        .map_or(Distance::Infinite, Distance::succ)
                } else {
                    Distance::Unknown
                }
            };
            if !distance.is_known() {
                break;
            }
            gen.set_distance(node, distance);
            queue.extend(
                gen.arg
                    .covered_nodes(node)
                    .iter()
                    .copied()
                    .filter(|&c| !gen.distance(c).is_known()),
            );
            match gen.arg.parent(node) {
                Some(parent) => node = parent,
                None => break,
            }
        }
    }
}
