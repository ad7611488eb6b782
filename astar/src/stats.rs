// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Counters collected during one check.

use crate::generation::Generation;
use arg::Analysis;
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IterationStats {
    pub iteration: usize,
    /// Nodes carried over from the previous iteration
    pub leftover_nodes: usize,
    /// Covering edges carried over from the previous iteration
    pub leftover_coverings: usize,
    pub expanded: usize,
    pub covered: usize,
    /// Searches run in older generations to compute heuristics
    pub nested_searches: usize,
    pub finite_distances: usize,
    pub infinite_distances: usize,
    pub targets: usize,
}

impl IterationStats {
    pub fn new(iteration: usize) -> Self {
        IterationStats {
            iteration,
            ..Default::default()
        }
    }

    pub(crate) fn record_start<A: Analysis>(&mut self, gen: &Generation<A>) {
        self.leftover_nodes = gen.arg().len();
        self.leftover_coverings = gen.arg().nodes().filter(|n| n.is_covered()).count();
    }

    pub(crate) fn record_end<A: Analysis>(&mut self, gen: &Generation<A>) {
        self.finite_distances = 0;
        self.infinite_distances = 0;
        for (_, node) in gen.search_nodes() {
            if node.distance().is_finite() {
                self.finite_distances += 1;
            } else if node.distance().is_infinite() {
                self.infinite_distances += 1;
            }
        }
        self.targets = gen.arg().nodes().filter(|n| n.is_target()).count();
    }
}

impl fmt::Display for IterationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iteration {}: {} leftover nodes ({} covered), {} expanded, {} covered, \
             {} nested searches, {} finite / {} infinite distances, {} targets",
            self.iteration,
            self.leftover_nodes,
            self.leftover_coverings,
            self.expanded,
            self.covered,
            self.nested_searches,
            self.finite_distances,
            self.infinite_distances,
            self.targets,
        )
    }
}
