// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The heuristic search types, as compile-time strategies of the engine.

use crate::commit;
use crate::distance::Distance;
use crate::engine::{generation, generation_mut, Engine, Generations};
use crate::generation::Generation;
use crate::search::AstarSearch;
use crate::stop::StopCriterion;
use arg::{Analysis, NodeId};

/// Where [`crate::config::HeuristicSearchType`]s differ.
pub(crate) trait Strategy: Copy {
    /// Heuristic of a non-target node whose provider has no known distance.
    fn find_heuristic_from_previous<A: Analysis>(
        self,
        engine: &mut Engine<'_, A, Self>,
        gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
    ) -> Distance;

    /// Turn a finished search into distances.
    fn commit_distances<A: Analysis>(self, gen: &mut Generation<A>, search: &AstarSearch) {
        commit::commit_partial(gen, search);
    }

    /// Called once the live generation `idx` was reset onto its copy.
    fn handle_copy<A: Analysis>(
        self,
        _engine: &mut Engine<'_, A, Self>,
        _gens: &mut Generations<A>,
        _idx: usize,
    ) {
    }

    /// Whether the search visits nodes that reach a target.
    fn returns_reached(self) -> bool {
        false
    }

    /// Whether providers that are targets get expanded on demand.
    fn expands_providers(self) -> bool {
        false
    }

    /// Whether a node may end up without a provider.
    fn tolerates_missing_provider(self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Full;

impl Strategy for Full {
    fn find_heuristic_from_previous<A: Analysis>(
        self,
        _engine: &mut Engine<'_, A, Self>,
        _gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
    ) -> Distance {
        panic!("full search knows every provider distance, but not that of {node} in generation {idx}")
    }

    fn commit_distances<A: Analysis>(self, gen: &mut Generation<A>, search: &AstarSearch) {
        commit::commit_full(gen, search);
    }

    fn returns_reached(self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SemiOndemand;

impl Strategy for SemiOndemand {
    /// Search the provider generation until the provider's distance is known.
    fn find_heuristic_from_previous<A: Analysis>(
        self,
        engine: &mut Engine<'_, A, Self>,
        gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
    ) -> Distance {
        let gen = generation(gens, idx);
        let (pidx, provider) = match (gen.provider(), gen.search_node(node).provider()) {
            (Some(pidx), Some(provider)) => (pidx, provider),
            _ => panic!("{node} in generation {idx} has no provider to search from"),
        };
        engine.stats.nested_searches += 1;
        log::debug!("nested search from {provider} in generation {pidx} for {node}");
        let (older, _) = gens.split_at_mut(idx);
        engine.find_distance_for_any(
            older,
            pidx,
            vec![provider],
            StopCriterion::DistanceKnowable,
        );
        let distance = generation(older, pidx).distance(provider);
        assert!(
            distance.is_known(),
            "nested search left the distance of {provider} unknown"
        );
        distance
    }

    fn expands_providers(self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Decreasing;

impl Strategy for Decreasing {
    /// One less than the tree parent's heuristic.
    fn find_heuristic_from_previous<A: Analysis>(
        self,
        _engine: &mut Engine<'_, A, Self>,
        gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
    ) -> Distance {
        let gen = generation(gens, idx);
        let parent = match gen.arg.parent(node) {
            Some(parent) => parent,
            None => return Distance::ZERO,
        };
        match gen.heuristic(parent) {
            Distance::Finite(h) => Distance::Finite(h.saturating_sub(1)),
            Distance::Infinite => Distance::Infinite,
            Distance::Unknown => panic!("tree parent {parent} of {node} has no heuristic"),
        }
    }

    fn handle_copy<A: Analysis>(
        self,
        engine: &mut Engine<'_, A, Self>,
        gens: &mut Generations<A>,
        idx: usize,
    ) {
        // parents come before their children in id order
        let nodes: Vec<NodeId> = generation(gens, idx).arg.node_ids().collect();
        for &node in &nodes {
            engine.ensure_heuristic(gens, idx, node);
        }
        let gen = generation_mut(gens, idx);
        for node in nodes {
            if let Some(coverer) = gen.arg.covering_node(node) {
                if gen.heuristic(node) > gen.heuristic(coverer) {
                    log::debug!("uncovering {node}: its heuristic exceeds that of {coverer}");
                    gen.arg.unset_covering_node(node);
                }
            }
        }
    }

    fn tolerates_missing_provider(self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::abstractor::{AbstractorResult, AstarAbstractor};
    use crate::config::{AstarConfig, HeuristicSearchType};
    use crate::distance::Distance;
    use crate::stop::StopCriterion;
    use crate::testing::GraphAnalysis;
    use arg::{Arg, ArgBuilder, NodeId};

    fn node_of(arg: &Arg<u32>, state: u32) -> NodeId {
        arg.nodes().find(|n| *n.state() == state).unwrap().id()
    }

    #[test]
    fn decreasing_copy_severs_inconsistent_coverings() {
        // 0 -> 1 -> 2 -> 3 -> 4 misses the target, 5 -> 6 -> 7 hits it, and
        // 9 below 5 is subsumed by 0
        let analysis = GraphAnalysis::new(
            &[(0, 1), (1, 2), (2, 3), (3, 4), (5, 9), (5, 6), (6, 7)],
            &[0, 5],
            &[7],
        )
        .with_leq(&[(9, 0)]);
        let mut abstractor = AstarAbstractor::new(
            ArgBuilder::new(analysis),
            AstarConfig::new(HeuristicSearchType::Decreasing, StopCriterion::FirstCex).unwrap(),
        )
        .unwrap();
        let mut arg = abstractor.create_arg();
        assert_eq!(abstractor.check(&mut arg, &()), AbstractorResult::Unsafe);
        let (zero, five, nine) = (node_of(&arg, 0), node_of(&arg, 5), node_of(&arg, 9));

        let solved = abstractor.solved_generation().unwrap();
        assert_eq!(solved.arg().covering_node(nine), Some(zero));
        assert_eq!(solved.distance(zero), Distance::Unknown);
        assert_eq!(solved.distance(nine), Distance::Unknown);
        assert_eq!(solved.distance(five), Distance::Finite(2));

        // 0 has no parent and no distance, 9 inherits from 5
        let live = abstractor.history().live().unwrap();
        assert_eq!(live.heuristic(zero), Distance::ZERO);
        assert_eq!(live.heuristic(five), Distance::Finite(2));
        assert_eq!(live.heuristic(nine), Distance::Finite(1));
        assert_eq!(arg.covering_node(nine), None);
        assert!(arg.covered_nodes(zero).is_empty());

        assert_eq!(abstractor.check(&mut arg, &()), AbstractorResult::Unsafe);
        let solved = abstractor.solved_generation().unwrap();
        assert!(solved.arg().is_expanded(nine));
        assert_eq!(solved.distance(nine), Distance::Infinite);
        assert_eq!(solved.distance(five), Distance::Finite(2));
    }
}
