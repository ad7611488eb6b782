// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! One CEGAR iteration's view of the reachability graph.

use crate::distance::Distance;
use crate::node::SearchNode;
use arg::hashmap::HashMap;
use arg::{Analysis, Arg, NodeId};
use std::fmt::Write;

/// A reachability graph decorated with [`SearchNode`]s.
///
/// `provider` is the index of an older generation in the
/// [`GenerationHistory`](crate::history::GenerationHistory); the providers of
/// the search nodes are ids in that generation's graph.
pub struct Generation<A: Analysis> {
    pub(crate) arg: Arg<A::State>,
    pub(crate) prec: A::Prec,
    nodes: HashMap<NodeId, SearchNode>,
    /// Covering candidates bucketed by [`Analysis::project`].
    reached: HashMap<A::Key, Vec<NodeId>>,
    provider: Option<usize>,
}

impl<A: Analysis> Generation<A> {
    pub fn new(arg: Arg<A::State>, prec: A::Prec, provider: Option<usize>) -> Self {
        Generation {
            arg,
            prec,
            nodes: HashMap::default(),
            reached: HashMap::default(),
            provider,
        }
    }

    pub fn arg(&self) -> &Arg<A::State> {
        &self.arg
    }

    /// Index of the generation providing heuristics for this one.
    pub fn provider(&self) -> Option<usize> {
        self.provider
    }

    pub fn get(&self, node: NodeId) -> Option<&SearchNode> {
        self.nodes.get(&node)
    }

    pub fn search_node(&self, node: NodeId) -> &SearchNode {
        match self.nodes.get(&node) {
            Some(n) => n,
            None => panic!("{node} has no search node"),
        }
    }

    pub(crate) fn search_node_mut(&mut self, node: NodeId) -> &mut SearchNode {
        match self.nodes.get_mut(&node) {
            Some(n) => n,
            None => panic!("{node} has no search node"),
        }
    }

    /// All search nodes, in creation order of their graph nodes.
    pub fn search_nodes(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> + '_ {
        self.nodes.iter().map(|(&id, n)| (id, n))
    }

    pub fn heuristic(&self, node: NodeId) -> Distance {
        self.search_node(node).heuristic()
    }

    pub fn distance(&self, node: NodeId) -> Distance {
        self.search_node(node).distance()
    }

    pub(crate) fn set_heuristic(&mut self, node: NodeId, value: Distance) {
        let target = self.arg.is_target(node);
        self.search_node_mut(node).set_heuristic(value, target);
    }

    pub(crate) fn set_distance(&mut self, node: NodeId, value: Distance) {
        let target = self.arg.is_target(node);
        self.search_node_mut(node).set_distance(value, target);
    }

    /// Register the search node of a freshly created graph node.
    pub(crate) fn insert(&mut self, analysis: &A, node: NodeId, search_node: SearchNode) {
        let key = analysis.project(self.arg.state(node));
        let previous = self.nodes.insert(node, search_node);
        assert!(previous.is_none(), "{node} already has a search node");
        self.reached.entry(key).or_default().push(node);
    }

    /// Nodes whose states may subsume the state of `node`.
    pub(crate) fn covering_candidates(&self, analysis: &A, node: NodeId) -> Vec<NodeId> {
        let key = analysis.project(self.arg.state(node));
        self.reached.get(&key).cloned().unwrap_or_default()
    }

    /// Drop the search nodes of graph nodes that were pruned.
    pub(crate) fn prune_apply(&mut self, analysis: &A) {
        let arg = &self.arg;
        self.nodes.retain(|&id, _| arg.contains(id));
        for id in arg.node_ids() {
            assert!(self.nodes.contains_key(&id), "{id} has no search node");
        }
        self.reached.clear();
        for node in arg.nodes() {
            let key = analysis.project(node.state());
            self.reached.entry(key).or_default().push(node.id());
        }
    }

    /// A structural copy sharing node ids, heuristics, distances and providers.
    pub(crate) fn structural_copy(&self) -> Self {
        let mut nodes = HashMap::default();
        for (&id, node) in &self.nodes {
            let target = self.arg.is_target(id);
            let mut copy = SearchNode::new(node.provider());
            if node.heuristic().is_known() {
                copy.set_heuristic(node.heuristic(), target);
            }
            if node.distance().is_known() {
                copy.set_distance(node.distance(), target);
            }
            nodes.insert(id, copy);
        }
        Generation {
            arg: self.arg.clone(),
            prec: self.prec.clone(),
            nodes,
            reached: self.reached.clone(),
            provider: self.provider,
        }
    }

    /// Point every node at its own copy in generation `copy` and forget
    /// everything computed in this generation.
    pub(crate) fn reset_onto(&mut self, copy: usize) {
        for (&id, node) in self.nodes.iter_mut() {
            node.set_provider(Some(id));
            node.reset();
        }
        self.provider = Some(copy);
    }

    /// Forget the provider generation.
    pub(crate) fn release_provider(&mut self) {
        self.provider = None;
        for node in self.nodes.values_mut() {
            node.set_provider(None);
        }
    }

    /// Assert that the heuristic does not drop by more than the weight of
    /// the edge from `parent` to `child`: 0 for a covering edge, 1 for a
    /// tree edge.
    pub fn check_consistency(&self, parent: NodeId, child: NodeId) {
        let (h_parent, h_child) = (self.heuristic(parent), self.heuristic(child));
        assert!(
            h_parent.is_known() && h_child.is_known(),
            "heuristics of {parent} and {child} must be known"
        );
        if h_parent.is_infinite() && h_child.is_infinite() {
            return;
        }
        assert!(
            !h_parent.is_infinite(),
            "{parent} has infinite heuristic but its successor {child} has {h_child}"
        );
        if h_child.is_infinite() {
            return;
        }
        let weight = if self.arg.is_covered(parent) { 0 } else { 1 };
        assert!(
            h_parent <= h_child + weight,
            "inconsistent heuristics: {parent} has {h_parent}, {child} has {h_child}"
        );
    }

    /// The graph is fully explored, or the distance of an init node is known
    /// to be finite.
    pub fn is_astar_complete(&self) -> bool {
        self.arg.is_complete()
            || self
                .arg
                .init_nodes()
                .iter()
                .any(|&n| self.distance(n).is_finite())
    }

    /// Render the generation in Graphviz dot format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph generation {\n");
        for node in self.arg.nodes() {
            let id = node.id();
            let (h, d) = match self.get(id) {
                Some(n) => (n.heuristic(), n.distance()),
                None => (Distance::Unknown, Distance::Unknown),
            };
            let shape = if node.is_target() {
                "doublecircle"
            } else {
                "circle"
            };
            writeln!(out, "  {id} [label=\"{id}\\nh={h} d={d}\", shape={shape}];").unwrap();
        }
        for node in self.arg.nodes() {
            for succ in node.succs() {
                writeln!(out, "  {} -> {succ};", node.id()).unwrap();
            }
            if let Some(coverer) = node.covering() {
                writeln!(out, "  {} -> {coverer} [style=dashed];", node.id()).unwrap();
            }
        }
        out.push_str("}\n");
        out
    }
}
