// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Growing a reachability graph with an [`Analysis`].

use crate::analysis::Analysis;
use crate::graph::{Arg, NodeId};

/// Creates graph nodes from the states computed by an analysis.
#[derive(Clone, Debug)]
pub struct ArgBuilder<A> {
    analysis: A,
}

impl<A: Analysis> ArgBuilder<A> {
    /// A builder creating nodes from the states of `analysis`.
    pub fn new(analysis: A) -> Self {
        ArgBuilder { analysis }
    }

    /// The underlying analysis.
    pub fn analysis(&self) -> &A {
        &self.analysis
    }

    /// An empty graph to be initialized with [`ArgBuilder::init`].
    pub fn create_arg(&self) -> Arg<A::State> {
        Arg::new()
    }

    /// Add the init states missing from `arg` and return the new init nodes.
    pub fn init(&self, arg: &mut Arg<A::State>, prec: &A::Prec) -> Vec<NodeId> {
        let mut new_nodes = vec![];
        for state in self.analysis.init_states(prec) {
            if arg.init_nodes().iter().any(|&n| arg.state(n) == &state) {
                continue;
            }
            let target = self.analysis.is_target(&state);
            let feasible = !self.analysis.is_bottom(&state);
            new_nodes.push(arg.create_init_node(state, target, feasible));
        }
        arg.set_initialized(true);
        log::debug!("initialized graph with {} new init nodes", new_nodes.len());
        new_nodes
    }

    /// Create the successors of `node` that are missing among its children
    /// and return them. Children left over from an earlier expansion are kept.
    pub fn expand(&self, arg: &mut Arg<A::State>, node: NodeId, prec: &A::Prec) -> Vec<NodeId> {
        let succ_states = self.analysis.succ_states(arg.state(node), prec);
        let mut new_nodes = vec![];
        for state in succ_states {
            if arg.succ_nodes(node).iter().any(|&n| arg.state(n) == &state) {
                continue;
            }
            let target = self.analysis.is_target(&state);
            let feasible = !self.analysis.is_bottom(&state);
            new_nodes.push(arg.create_succ_node(node, state, target, feasible));
        }
        arg.set_expanded(node, true);
        log::trace!("expanded {node} into {} new nodes", new_nodes.len());
        new_nodes
    }

    /// Whether `candidate` may cover `node`.
    ///
    /// The candidate's state must subsume the node's, and no node on the
    /// candidate's tree path (the candidate included) may be the node itself
    /// or be subsumed.
    pub fn may_cover(&self, arg: &Arg<A::State>, node: NodeId, candidate: NodeId) -> bool {
        node != candidate
            && self.analysis.is_leq(arg.state(node), arg.state(candidate))
            && arg
                .ancestors(candidate)
                .all(|n| n != node && !arg.is_subsumed(n))
    }
}
