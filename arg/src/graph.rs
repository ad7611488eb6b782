// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The abstract reachability graph.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Ids are never
//! reused: pruning leaves a vacant slot behind, so an id that is still
//! [`Arg::contains`]ed always refers to the same node. Cloning an [`Arg`]
//! keeps every id, which makes the identity on ids the correspondence between
//! a graph and its copy.

use std::fmt;

/// Stable index of a node in an [`Arg`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The arena slot of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node of the reachability graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgNode<S> {
    id: NodeId,
    state: S,
    depth: usize,
    target: bool,
    feasible: bool,
    parent: Option<NodeId>,
    succs: Vec<NodeId>,
    covering: Option<NodeId>,
    covered: Vec<NodeId>,
    expanded: bool,
}

impl<S> ArgNode<S> {
    /// The id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The abstract state labelling this node.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Number of tree edges between this node and its init node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the state is an error state.
    pub fn is_target(&self) -> bool {
        self.target
    }

    /// Whether the state is not bottom.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// The tree parent, `None` for init nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Tree successors in creation order.
    pub fn succs(&self) -> &[NodeId] {
        &self.succs
    }

    /// The node covering this one, if any.
    pub fn covering(&self) -> Option<NodeId> {
        self.covering
    }

    /// Nodes covered by this one.
    pub fn covered(&self) -> &[NodeId] {
        &self.covered
    }

    /// Whether all successors of the state have been created.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether this node has no tree successors.
    pub fn is_leaf(&self) -> bool {
        self.succs.is_empty()
    }

    /// Whether this node is covered.
    pub fn is_covered(&self) -> bool {
        self.covering.is_some()
    }

    /// Whether this node is an init node.
    pub fn is_init(&self) -> bool {
        self.parent.is_none()
    }

    /// Covered or infeasible: the subtree below this node need not be explored.
    pub fn is_subsumed(&self) -> bool {
        self.is_covered() || !self.feasible
    }
}

/// An abstract reachability graph: a forest of [`ArgNode`]s plus covering edges.
#[derive(Clone, Debug)]
pub struct Arg<S> {
    nodes: Vec<Option<ArgNode<S>>>,
    init_nodes: Vec<NodeId>,
    initialized: bool,
}

impl<S> Default for Arg<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Arg<S> {
    /// An empty, uninitialized graph.
    pub fn new() -> Self {
        Arg {
            nodes: vec![],
            init_nodes: vec![],
            initialized: false,
        }
    }

    fn alloc(
        &mut self,
        state: S,
        depth: usize,
        target: bool,
        feasible: bool,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(ArgNode {
            id,
            state,
            depth,
            target,
            feasible,
            parent,
            succs: vec![],
            covering: None,
            covered: vec![],
            expanded: false,
        }));
        id
    }

    /// Add a new init node.
    pub fn create_init_node(&mut self, state: S, target: bool, feasible: bool) -> NodeId {
        let id = self.alloc(state, 0, target, feasible, None);
        self.init_nodes.push(id);
        id
    }

    /// Add a new tree successor of `parent`.
    pub fn create_succ_node(
        &mut self,
        parent: NodeId,
        state: S,
        target: bool,
        feasible: bool,
    ) -> NodeId {
        assert!(
            !self.is_covered(parent),
            "cannot create a successor of covered node {parent}"
        );
        let depth = self.node(parent).depth + 1;
        let id = self.alloc(state, depth, target, feasible, Some(parent));
        self.node_mut(parent).succs.push(id);
        id
    }

    /// Look up a node, panicking if it is not in the graph.
    pub fn node(&self, id: NodeId) -> &ArgNode<S> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id} is not in the graph"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ArgNode<S> {
        match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("node {id} is not in the graph"),
        }
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&ArgNode<S>> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Whether the node exists (was created and not pruned).
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Live nodes in creation order. Parents always come before their children.
    pub fn nodes(&self) -> impl Iterator<Item = &ArgNode<S>> + '_ {
        self.nodes.iter().flatten()
    }

    /// Ids of the live nodes in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().map(|n| n.id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Whether the graph has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes().next().is_none()
    }

    /// The init nodes.
    pub fn init_nodes(&self) -> &[NodeId] {
        &self.init_nodes
    }

    /// Whether all init states have been added.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set by the builder after adding the init states.
    pub fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    /// The abstract state of `id`.
    pub fn state(&self, id: NodeId) -> &S {
        &self.node(id).state
    }

    /// Tree depth of `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        self.node(id).depth
    }

    /// Tree parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Tree successors of `id` in creation order.
    pub fn succ_nodes(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).succs
    }

    /// The node covering `id`.
    pub fn covering_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).covering
    }

    /// Nodes covered by `id`.
    pub fn covered_nodes(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).covered
    }

    /// Whether `id` has a covering edge.
    pub fn is_covered(&self, id: NodeId) -> bool {
        self.node(id).is_covered()
    }

    /// Whether all successors of `id` exist.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node(id).expanded
    }

    /// Set by the builder once all successors exist.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        self.node_mut(id).expanded = expanded;
    }

    /// Whether `id` has no tree successors.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    /// Whether the state of `id` is an error state.
    pub fn is_target(&self, id: NodeId) -> bool {
        self.node(id).target
    }

    /// Whether the state of `id` is not bottom.
    pub fn is_feasible(&self, id: NodeId) -> bool {
        self.node(id).feasible
    }

    /// Whether `id` is an init node.
    pub fn is_init(&self, id: NodeId) -> bool {
        self.node(id).is_init()
    }

    /// Whether `id` is covered or infeasible.
    pub fn is_subsumed(&self, id: NodeId) -> bool {
        self.node(id).is_subsumed()
    }

    /// Cover `node` by `coverer`.
    ///
    /// Nodes that were covered by `node` are moved over to `coverer`, so a
    /// covering edge always points at an uncovered node.
    pub fn cover(&mut self, node: NodeId, coverer: NodeId) {
        assert_ne!(node, coverer, "node {node} cannot cover itself");
        assert!(!self.is_covered(node), "node {node} is already covered");
        assert!(
            !self.is_covered(coverer),
            "covering node {coverer} is itself covered"
        );
        let moved = std::mem::take(&mut self.node_mut(node).covered);
        for &covered in &moved {
            self.node_mut(covered).covering = Some(coverer);
        }
        let coverer_node = self.node_mut(coverer);
        coverer_node.covered.extend(moved);
        coverer_node.covered.push(node);
        self.node_mut(node).covering = Some(coverer);
    }

    /// Remove the covering edge leaving `node`, if any.
    pub fn unset_covering_node(&mut self, node: NodeId) {
        if let Some(coverer) = self.node_mut(node).covering.take() {
            self.node_mut(coverer).covered.retain(|&n| n != node);
        }
    }

    /// Remove all covering edges entering `node`.
    pub fn clear_covered_nodes(&mut self, node: NodeId) {
        for covered in std::mem::take(&mut self.node_mut(node).covered) {
            self.node_mut(covered).covering = None;
        }
    }

    /// Remove `node` and its subtree.
    ///
    /// Covering edges touching the subtree disappear, the parent becomes
    /// unexpanded, and pruning an init node leaves the graph uninitialized.
    pub fn prune(&mut self, node: NodeId) {
        let subtree = self.descendants(node);
        for &n in &subtree {
            self.unset_covering_node(n);
            self.clear_covered_nodes(n);
        }
        match self.parent(node) {
            Some(parent) => {
                let parent = self.node_mut(parent);
                parent.succs.retain(|&n| n != node);
                parent.expanded = false;
            }
            None => {
                self.init_nodes.retain(|&n| n != node);
                self.initialized = false;
            }
        }
        for n in subtree {
            self.nodes[n.0] = None;
        }
        log::trace!("pruned {node}");
    }

    /// Remove every node.
    pub fn prune_all(&mut self) {
        for init in self.init_nodes.clone() {
            self.prune(init);
        }
        self.initialized = false;
    }

    /// The node itself followed by its tree ancestors up to an init node.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |&n| self.parent(n))
    }

    /// The node and its tree descendants in preorder.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = vec![];
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            result.push(n);
            stack.extend(self.succ_nodes(n).iter().rev());
        }
        result
    }

    /// Some ancestor (or the node itself) is subsumed.
    pub fn is_excluded(&self, node: NodeId) -> bool {
        self.ancestors(node).any(|n| self.is_subsumed(n))
    }

    /// Targets that are not excluded, i.e. abstract counterexamples.
    pub fn unsafe_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(|n| n.target && !self.is_excluded(n.id))
            .map(|n| n.id)
    }

    /// No abstract counterexample is present.
    pub fn is_safe(&self) -> bool {
        self.unsafe_nodes().next().is_none()
    }

    /// Every node that is neither a target nor excluded is expanded.
    pub fn is_complete(&self) -> bool {
        self.nodes()
            .all(|n| n.expanded || n.target || self.is_excluded(n.id))
    }

    /// Leaves whose successors were computed, and turned out empty.
    pub fn expanded_leaf_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(|n| n.expanded && n.is_leaf())
            .map(|n| n.id)
    }

    /// The tree path from an init node to `node`.
    pub fn trace_to(&self, node: NodeId) -> Vec<NodeId> {
        let mut trace: Vec<NodeId> = self.ancestors(node).collect();
        trace.reverse();
        trace
    }
}
