// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Counterexample-guided refinement of block partitions.

use crate::block::{Block, Partition};
use crate::system::ExplicitSystem;
use arg::{Arg, NodeId};
use std::sync::Arc;

/// Outcome of refining an unsafe graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefinerResult {
    /// The abstract counterexample has no concrete counterpart; check again
    /// with the refined partition
    Spurious(Partition),
    /// A concrete path from an init state to a target
    Unsafe(Vec<u32>),
}

/// Refines along the shallowest abstract counterexample.
#[derive(Clone, Debug)]
pub struct TraceRefiner {
    system: Arc<ExplicitSystem>,
}

impl TraceRefiner {
    pub fn new(system: Arc<ExplicitSystem>) -> Self {
        TraceRefiner { system }
    }

    /// Replay a counterexample of `arg` concretely.
    ///
    /// If it is spurious, the partition is split by the states reachable at
    /// the last step of the trace that still had any, and the graph is pruned
    /// at that step so the next check rebuilds it under the finer partition.
    pub fn refine(&self, arg: &mut Arg<Block>, prec: &Partition) -> RefinerResult {
        let target = match shallowest_target(arg) {
            Some(target) => target,
            None => panic!("refining a graph without abstract counterexample"),
        };
        let trace = arg.trace_to(target);
        let blocks: Vec<&Block> = trace.iter().map(|&n| arg.state(n)).collect();
        log::debug!("refining along a trace of length {}", trace.len());

        if let Some(states) = self.system.concrete_trace(blocks.iter().copied()) {
            log::info!("counterexample is feasible");
            return RefinerResult::Unsafe(states);
        }

        let mut reach = self.system.replay(blocks.iter().copied());
        if reach.last().is_some_and(|r| r.is_empty()) {
            reach.pop();
        }
        let pivot = match reach.len().checked_sub(1) {
            Some(pivot) => pivot,
            None => panic!("init block {:?} contains no init state", blocks[0]),
        };
        let refined = prec.split(&reach[pivot]);
        log::info!(
            "counterexample is spurious after step {pivot}: {} blocks become {}",
            prec.len(),
            refined.len()
        );
        arg.prune(trace[pivot]);
        RefinerResult::Spurious(refined)
    }
}

fn shallowest_target(arg: &Arg<Block>) -> Option<NodeId> {
    arg.unsafe_nodes().min_by_key(|&n| (arg.depth(n), n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockAnalysis;
    use arg::ArgBuilder;
    use std::collections::BTreeSet;

    /// 0 -> 1 -> 2, 3 -> 4; only 4 is a target
    fn system() -> Arc<ExplicitSystem> {
        Arc::new(ExplicitSystem::new(5, &[0], &[(0, 1), (1, 2), (3, 4)], &[4]).unwrap())
    }

    fn explore(builder: &ArgBuilder<BlockAnalysis>, prec: &Partition) -> Arg<Block> {
        let mut arg = builder.create_arg();
        let mut frontier = builder.init(&mut arg, prec);
        while let Some(node) = frontier.pop() {
            if !arg.is_target(node) && arg.depth(node) < 3 {
                frontier.extend(builder.expand(&mut arg, node, prec));
            }
        }
        arg
    }

    #[test]
    fn spurious_trace_splits_and_prunes() {
        let system = system();
        let builder = ArgBuilder::new(BlockAnalysis::new(system.clone()));
        let refiner = TraceRefiner::new(system.clone());
        let prec = Partition::initial(&system);
        let mut arg = explore(&builder, &prec);
        assert!(!arg.is_safe());

        let refined = match refiner.refine(&mut arg, &prec) {
            RefinerResult::Spurious(refined) => refined,
            result => panic!("expected a spurious counterexample, got {result:?}"),
        };
        insta::assert_display_snapshot!(refined, @"{0} {1, 2, 3} {4}");
        assert!(arg.is_empty());
        assert!(!arg.is_initialized());
    }

    #[test]
    fn feasible_trace() {
        let system = Arc::new(ExplicitSystem::new(3, &[0], &[(0, 1), (1, 2)], &[2]).unwrap());
        let builder = ArgBuilder::new(BlockAnalysis::new(system.clone()));
        let prec = Partition::initial(&system).split(&BTreeSet::from([0]));
        let mut arg = explore(&builder, &prec);
        let result = TraceRefiner::new(system).refine(&mut arg, &prec);
        assert_eq!(result, RefinerResult::Unsafe(vec![0, 1, 2]));
    }
}
