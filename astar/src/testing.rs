// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A small explicit-graph analysis for unit tests.

use crate::distance::Distance;
use arg::Analysis;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// States are the vertices of a fixed graph; the precision is ignored.
#[derive(Clone, Debug, Default)]
pub(crate) struct GraphAnalysis {
    succs: BTreeMap<u32, Vec<u32>>,
    init: Vec<u32>,
    targets: BTreeSet<u32>,
    bottom: BTreeSet<u32>,
    /// `(a, b)`: `a` is subsumed by `b`, besides equal states
    leq: BTreeSet<(u32, u32)>,
}

impl GraphAnalysis {
    pub fn new(edges: &[(u32, u32)], init: &[u32], targets: &[u32]) -> Self {
        let mut succs: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for &(from, to) in edges {
            succs.entry(from).or_default().push(to);
        }
        GraphAnalysis {
            succs,
            init: init.to_vec(),
            targets: targets.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn with_leq(mut self, pairs: &[(u32, u32)]) -> Self {
        self.leq.extend(pairs.iter().copied());
        self
    }

    pub fn with_bottom(mut self, states: &[u32]) -> Self {
        self.bottom.extend(states.iter().copied());
        self
    }

    /// Breadth-first distance from `from` to the nearest target.
    pub fn shortest_distance(&self, from: u32) -> Distance {
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([(from, 0)]);
        while let Some((state, depth)) = queue.pop_front() {
            if self.targets.contains(&state) {
                return Distance::Finite(depth);
            }
            if self.bottom.contains(&state) {
                continue;
            }
            for &next in self.succs.get(&state).into_iter().flatten() {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        Distance::Infinite
    }
}

impl Analysis for GraphAnalysis {
    type State = u32;
    type Prec = ();
    type Key = ();

    fn init_states(&self, _: &()) -> Vec<u32> {
        self.init.clone()
    }

    fn succ_states(&self, state: &u32, _: &()) -> Vec<u32> {
        if self.bottom.contains(state) {
            return vec![];
        }
        self.succs.get(state).cloned().unwrap_or_default()
    }

    fn is_target(&self, state: &u32) -> bool {
        self.targets.contains(state)
    }

    fn is_bottom(&self, state: &u32) -> bool {
        self.bottom.contains(state)
    }

    fn is_leq(&self, a: &u32, b: &u32) -> bool {
        a == b || self.leq.contains(&(*a, *b))
    }

    fn project(&self, _: &u32) {}
}

/// Two graphs over the same states: the coarse one is explored under
/// precision `false`, the fine one under `true`. Targets, bottom states and
/// the order are those of either graph.
#[derive(Clone, Debug)]
pub(crate) struct RefinedAnalysis {
    coarse: GraphAnalysis,
    fine: GraphAnalysis,
}

impl RefinedAnalysis {
    pub fn new(coarse: GraphAnalysis, fine: GraphAnalysis) -> Self {
        RefinedAnalysis { coarse, fine }
    }

    fn graph(&self, fine: bool) -> &GraphAnalysis {
        if fine {
            &self.fine
        } else {
            &self.coarse
        }
    }
}

impl Analysis for RefinedAnalysis {
    type State = u32;
    type Prec = bool;
    type Key = ();

    fn init_states(&self, prec: &bool) -> Vec<u32> {
        self.graph(*prec).init_states(&())
    }

    fn succ_states(&self, state: &u32, prec: &bool) -> Vec<u32> {
        self.graph(*prec).succ_states(state, &())
    }

    fn is_target(&self, state: &u32) -> bool {
        self.coarse.is_target(state) || self.fine.is_target(state)
    }

    fn is_bottom(&self, state: &u32) -> bool {
        self.coarse.is_bottom(state) || self.fine.is_bottom(state)
    }

    fn is_leq(&self, a: &u32, b: &u32) -> bool {
        self.coarse.is_leq(a, b) || self.fine.is_leq(a, b)
    }

    fn project(&self, _: &u32) {}
}
