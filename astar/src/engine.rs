// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The distance search over a stack of generations.
//!
//! Every operation takes the generations as a slice together with the index
//! of the generation it works on. Searches only ever recurse into strictly
//! older generations, so a nested call gets the prefix of the slice ending at
//! the provider generation.

use crate::distance::Distance;
use crate::generation::Generation;
use crate::node::SearchNode;
use crate::search::AstarSearch;
use crate::stats::IterationStats;
use crate::stop::StopCriterion;
use crate::strategy::Strategy;
use arg::{Analysis, ArgBuilder, NodeId};

pub(crate) type Generations<A> = [Option<Generation<A>>];

pub(crate) fn generation<A: Analysis>(gens: &Generations<A>, idx: usize) -> &Generation<A> {
    match gens.get(idx) {
        Some(Some(gen)) => gen,
        _ => panic!("generation {idx} is not in the history"),
    }
}

pub(crate) fn generation_mut<A: Analysis>(
    gens: &mut Generations<A>,
    idx: usize,
) -> &mut Generation<A> {
    match gens.get_mut(idx) {
        Some(Some(gen)) => gen,
        _ => panic!("generation {idx} is not in the history"),
    }
}

pub(crate) struct Engine<'a, A: Analysis, St> {
    pub builder: &'a ArgBuilder<A>,
    pub strategy: St,
    pub stats: &'a mut IterationStats,
}

impl<'a, A: Analysis, St: Strategy> Engine<'a, A, St> {
    /// Make the heuristic of `node` known and return it.
    ///
    /// Calling this again for the same node returns the same value without
    /// doing any work.
    pub fn ensure_heuristic(
        &mut self,
        gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
    ) -> Distance {
        let gen = generation(gens, idx);
        let search_node = gen.search_node(node);
        if search_node.heuristic().is_known() {
            return search_node.heuristic();
        }
        let provider_distance = match (gen.provider(), search_node.provider()) {
            (Some(pidx), Some(provider)) => generation(gens, pidx).distance(provider),
            _ => Distance::Unknown,
        };
        let value = if gen.arg.is_target(node) {
            assert!(
                !provider_distance.is_known() || provider_distance == Distance::ZERO,
                "target {node} has a provider at distance {provider_distance}"
            );
            Distance::ZERO
        } else if gen.provider().is_none() {
            Distance::ZERO
        } else if provider_distance.is_known() {
            provider_distance
        } else {
            let strategy = self.strategy;
            strategy.find_heuristic_from_previous(self, gens, idx, node)
        };
        generation_mut(gens, idx).set_heuristic(node, value);
        value
    }

    /// Compute the distance of at least one of `start_nodes`: afterwards one
    /// of them has a finite distance or all of them are infinite.
    pub fn find_distance_for_any(
        &mut self,
        gens: &mut Generations<A>,
        idx: usize,
        start_nodes: Vec<NodeId>,
        stop: StopCriterion,
    ) {
        let gen = generation(gens, idx);
        if start_nodes.iter().any(|&n| gen.distance(n).is_finite()) {
            return;
        }
        let targets: Vec<NodeId> = start_nodes
            .iter()
            .copied()
            .filter(|&n| gen.arg.is_target(n))
            .collect();
        if !targets.is_empty() {
            for target in targets {
                self.ensure_heuristic(gens, idx, target);
                generation_mut(gens, idx).set_distance(target, Distance::ZERO);
            }
            return;
        }

        log::debug!(
            "searching generation {idx} from {} start nodes",
            start_nodes.len()
        );
        for &node in &start_nodes {
            self.ensure_heuristic(gens, idx, node);
        }
        let gen = generation_mut(gens, idx);
        let mut search_start = vec![];
        for &node in &start_nodes {
            if gen.heuristic(node).is_infinite() {
                gen.set_distance(node, Distance::Infinite);
            } else if !gen.distance(node).is_infinite() {
                search_start.push(node);
            }
        }

        let mut search = AstarSearch::new(search_start.clone(), stop);
        for &node in &search_start {
            search.add_to_waitlist(gen, node, None, 0);
        }
        while let Some((node, depth)) =
            search.remove_from_waitlist(generation(gens, idx), self.strategy.returns_reached())
        {
            self.visit_node(gens, idx, &mut search, node, depth);
        }
        self.strategy
            .commit_distances(generation_mut(gens, idx), &search);

        let gen = generation(gens, idx);
        assert!(
            start_nodes.iter().any(|&n| gen.distance(n).is_finite())
                || start_nodes.iter().all(|&n| gen.distance(n).is_infinite()),
            "search in generation {idx} left the start nodes undecided"
        );
    }

    fn visit_node(
        &mut self,
        gens: &mut Generations<A>,
        idx: usize,
        search: &mut AstarSearch,
        node: NodeId,
        depth: u32,
    ) {
        log::trace!("visiting {node} at depth {depth} in generation {idx}");
        let node = self
            .close(gens, idx, node, Some(&mut *search))
            .unwrap_or(node);

        if let Some(coverer) = generation(gens, idx).arg.covering_node(node) {
            self.ensure_heuristic(gens, idx, coverer);
            let gen = generation(gens, idx);
            gen.check_consistency(node, coverer);
            search.add_to_waitlist(gen, coverer, Some(node), depth);
            return;
        }

        let gen = generation_mut(gens, idx);
        if !gen.arg.is_feasible(node) {
            return;
        }
        if !gen.arg.is_expanded(node) {
            let new_nodes = self.builder.expand(&mut gen.arg, node, &gen.prec);
            self.stats.expanded += 1;
            for succ in new_nodes {
                self.create_search_node(gens, idx, succ);
            }
        }

        let succs = generation(gens, idx).arg.succ_nodes(node).to_vec();
        for succ in succs {
            self.ensure_heuristic(gens, idx, succ);
            let gen = generation(gens, idx);
            gen.check_consistency(node, succ);
            search.add_to_waitlist(gen, succ, Some(node), depth + 1);
        }
    }

    /// Try to cover `node` by a node from its covering-candidate bucket.
    ///
    /// Returns the node the search should continue with when the search
    /// parent of `node` was a node covered by it: that parent is now covered
    /// by the new coverer directly.
    pub fn close(
        &mut self,
        gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
        search: Option<&mut AstarSearch>,
    ) -> Option<NodeId> {
        let gen = generation(gens, idx);
        if gen.arg.is_covered(node) || gen.arg.is_expanded(node) || !gen.arg.is_leaf(node) {
            return None;
        }
        let target = gen.arg.is_target(node);
        let heuristic = gen.heuristic(node);
        assert!(heuristic.is_known(), "{node} is closed without a heuristic");

        for candidate in gen.covering_candidates(self.builder.analysis(), node) {
            let gen = generation(gens, idx);
            if target && !gen.arg.is_target(candidate) {
                continue;
            }
            if !self.builder.may_cover(&gen.arg, node, candidate) {
                continue;
            }
            if self.ensure_heuristic(gens, idx, candidate) < heuristic {
                continue;
            }

            generation_mut(gens, idx).arg.cover(node, candidate);
            self.stats.covered += 1;
            log::trace!("covered {node} by {candidate} in generation {idx}");

            let search = search?;
            let parent = search.parent(node)?;
            let gen = generation(gens, idx);
            if gen.arg.covering_node(parent) == Some(candidate) {
                search.remove_parent(node);
                gen.check_consistency(parent, candidate);
                return Some(parent);
            }
            return None;
        }
        None
    }

    /// Attach a search node, with its provider resolved, to a new graph node.
    pub fn create_search_node(&mut self, gens: &mut Generations<A>, idx: usize, node: NodeId) {
        let provider = match generation(gens, idx).provider() {
            Some(_) => self.find_provider(gens, idx, node),
            None => None,
        };
        generation_mut(gens, idx).insert(self.builder.analysis(), node, SearchNode::new(provider));
    }

    /// The most precise node of the provider generation subsuming `node`.
    fn find_provider(&mut self, gens: &mut Generations<A>, idx: usize, node: NodeId) -> Option<NodeId> {
        let pidx = generation(gens, idx).provider()?;
        let candidates = self.provider_candidates(gens, idx, node);

        let gen = generation(gens, idx);
        let pgen = generation(gens, pidx);
        let analysis = self.builder.analysis();
        let state = gen.arg.state(node);
        let subsuming: Vec<NodeId> = candidates
            .unwrap_or_default()
            .into_iter()
            .filter(|&c| analysis.is_leq(state, pgen.arg.state(c)))
            .collect();
        // prefer the largest known distance, the tightest lower bound
        let provider = subsuming
            .iter()
            .rev()
            .copied()
            .filter(|&c| pgen.distance(c).is_known())
            .max_by_key(|&c| pgen.distance(c))
            .or_else(|| subsuming.first().copied());

        if provider.is_none() {
            assert!(
                self.strategy.tolerates_missing_provider(),
                "{node} has no provider in generation {pidx}"
            );
            if gen.arg.is_init(node) {
                log::warn!("init node {node} has no provider: the abstract order is imprecise");
            }
        }
        provider
    }

    /// Successors of the tree parent's provider, or the provider
    /// generation's init nodes for an init node.
    fn provider_candidates(
        &mut self,
        gens: &mut Generations<A>,
        idx: usize,
        node: NodeId,
    ) -> Option<Vec<NodeId>> {
        let gen = generation(gens, idx);
        let pidx = gen.provider()?;
        let parent = match gen.arg.parent(node) {
            Some(parent) => parent,
            None => return Some(generation(gens, pidx).arg.init_nodes().to_vec()),
        };
        let mut parent_provider = match gen.search_node(parent).provider() {
            Some(provider) => provider,
            None => {
                assert!(
                    self.strategy.tolerates_missing_provider(),
                    "tree parent {parent} of {node} has no provider"
                );
                return None;
            }
        };

        if self.strategy.expands_providers() {
            let (older, _) = gens.split_at_mut(idx);
            self.create_children(older, pidx, parent_provider);
        }

        if let Some(coverer) = generation(gens, pidx).arg.covering_node(parent_provider) {
            parent_provider = coverer;
            generation_mut(gens, idx)
                .search_node_mut(parent)
                .set_provider(Some(coverer));
        }

        let pgen = generation(gens, pidx);
        if !pgen.arg.is_expanded(parent_provider) {
            assert!(
                self.strategy.tolerates_missing_provider(),
                "provider {parent_provider} of {parent} is not expanded"
            );
            return None;
        }
        Some(pgen.arg.succ_nodes(parent_provider).to_vec())
    }

    /// Make sure `node` of generation `idx` (or its coverer) has children.
    ///
    /// Only targets can be missing them: goal-directed searches never expand
    /// past a target. Such a target is first covered by another target if
    /// possible, and expanded otherwise.
    fn create_children(&mut self, gens: &mut Generations<A>, idx: usize, node: NodeId) {
        let gen = generation(gens, idx);
        let mut node = node;
        if !gen.arg.is_target(node) {
            match gen.arg.covering_node(node) {
                Some(coverer) if gen.arg.is_target(coverer) => node = coverer,
                coverer => {
                    assert!(
                        gen.arg.is_expanded(node)
                            || coverer.is_some_and(|c| gen.arg.is_expanded(c)),
                        "provider {node} is neither expanded nor covered by an expanded node"
                    );
                    return;
                }
            }
        }

        loop {
            let gen = generation(gens, idx);
            if let Some(coverer) = gen.arg.covering_node(node) {
                assert!(gen.arg.is_target(coverer), "target {node} covered by non-target");
                node = coverer;
                continue;
            }
            if gen.arg.is_expanded(node) {
                return;
            }
            self.ensure_heuristic(gens, idx, node);
            self.close(gens, idx, node, None);
            if generation(gens, idx).arg.is_covered(node) {
                continue;
            }

            let gen = generation_mut(gens, idx);
            let new_nodes = self.builder.expand(&mut gen.arg, node, &gen.prec);
            self.stats.expanded += 1;
            log::debug!("expanded target {node} of generation {idx} on demand");
            for succ in new_nodes {
                self.create_search_node(gens, idx, succ);
                let gen = generation_mut(gens, idx);
                if gen.arg.is_target(succ) {
                    gen.set_heuristic(succ, Distance::ZERO);
                    gen.set_distance(succ, Distance::ZERO);
                }
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{GenerationHistory, Retention};
    use crate::strategy::{Decreasing, SemiOndemand};
    use crate::testing::GraphAnalysis;
    use arg::Arg;

    fn run(
        analysis: GraphAnalysis,
        arg: Arg<u32>,
        heuristics: &[(NodeId, Distance)],
        start: Vec<NodeId>,
    ) -> (Generation<GraphAnalysis>, IterationStats) {
        let builder = ArgBuilder::new(analysis);
        let mut gen = Generation::new(arg, (), None);
        for id in gen.arg().node_ids().collect::<Vec<_>>() {
            gen.insert(builder.analysis(), id, SearchNode::new(None));
        }
        for &(node, h) in heuristics {
            gen.set_heuristic(node, h);
        }
        let mut gens = vec![Some(gen)];
        let mut stats = IterationStats::default();
        let mut engine = Engine {
            builder: &builder,
            strategy: Decreasing,
            stats: &mut stats,
        };
        engine.find_distance_for_any(&mut gens, 0, start, StopCriterion::FirstCex);
        let gen = gens.pop().flatten().unwrap();
        (gen, stats)
    }

    #[test]
    fn covered_by_target() {
        let analysis = GraphAnalysis::new(&[(0, 1)], &[5, 0], &[5]).with_leq(&[(0, 5)]);
        let mut arg = Arg::new();
        let target = arg.create_init_node(5, true, true);
        let start = arg.create_init_node(0, false, true);
        arg.set_initialized(true);

        let (gen, stats) = run(analysis, arg, &[], vec![start]);
        assert_eq!(gen.arg().covering_node(start), Some(target));
        assert_eq!(gen.distance(start), Distance::ZERO);
        assert_eq!(gen.distance(target), Distance::ZERO);
        assert_eq!(stats.covered, 1);
        assert_eq!(stats.expanded, 0);
    }

    #[test]
    fn infinite_heuristic_is_not_expanded() {
        let analysis = GraphAnalysis::new(&[(0, 1), (1, 2), (2, 3)], &[0], &[3]);
        let mut arg = Arg::new();
        let start = arg.create_init_node(0, false, true);
        let a = arg.create_succ_node(start, 1, false, true);
        let b = arg.create_succ_node(a, 2, false, true);
        arg.set_initialized(true);
        arg.set_expanded(start, true);
        arg.set_expanded(a, true);

        let heuristics = [
            (start, Distance::ZERO),
            (a, Distance::ZERO),
            (b, Distance::Infinite),
        ];
        let (gen, stats) = run(analysis, arg, &heuristics, vec![start]);
        assert!(!gen.arg().is_expanded(b));
        assert_eq!(stats.expanded, 0);
        for node in [start, a, b] {
            assert_eq!(gen.distance(node), Distance::Infinite);
        }
    }

    #[test]
    fn infeasible_nodes_are_dead_ends() {
        let analysis = GraphAnalysis::new(&[(0, 1), (0, 2), (1, 3), (2, 4), (4, 3)], &[0], &[3])
            .with_bottom(&[1]);
        let mut arg = Arg::new();
        let start = arg.create_init_node(0, false, true);
        arg.set_initialized(true);

        let (gen, _) = run(analysis, arg, &[], vec![start]);
        assert_eq!(gen.distance(start), Distance::Finite(3));
        let bottom = gen.arg().nodes().find(|n| *n.state() == 1).unwrap();
        assert!(!bottom.is_feasible());
        assert!(!bottom.is_expanded());
    }

    #[test]
    fn covering_moves_the_search_parent_along() {
        // 1 is covered by 2, which in turn is covered by 3
        let analysis = GraphAnalysis::new(&[(0, 4), (0, 1), (4, 2), (4, 3), (3, 5)], &[0], &[5])
            .with_leq(&[(1, 2), (2, 3)]);
        let mut arg = Arg::new();
        let start = arg.create_init_node(0, false, true);
        arg.set_initialized(true);

        let (gen, stats) = run(analysis, arg, &[], vec![start]);
        let node = |state: u32| gen.arg().nodes().find(|n| *n.state() == state).unwrap().id();
        let (one, two, three, four) = (node(1), node(2), node(3), node(4));
        assert_eq!(stats.covered, 2);
        assert_eq!(gen.arg().covering_node(one), Some(three));
        assert_eq!(gen.arg().covering_node(two), Some(three));
        assert_eq!(gen.arg().covered_nodes(three), &[one, two]);
        // the path 0 -> 1 ~> 3 -> 5 skips 4
        assert_eq!(gen.distance(start), Distance::Finite(2));
        assert_eq!(gen.distance(one), Distance::Finite(1));
        assert_eq!(gen.distance(three), Distance::Finite(1));
        assert_eq!(gen.distance(two), Distance::Finite(1));
        assert_eq!(gen.distance(four), Distance::Finite(2));
        assert!(!gen.arg().is_expanded(two));
    }

    /// Generation 0 holds `arg` with zero heuristics and the given
    /// distances; generation 1 is its reset copy.
    fn frozen(
        analysis: &GraphAnalysis,
        arg: Arg<u32>,
        distances: &[(NodeId, Distance)],
    ) -> GenerationHistory<GraphAnalysis> {
        let mut gen = Generation::new(arg, (), None);
        for id in gen.arg().node_ids().collect::<Vec<_>>() {
            gen.insert(analysis, id, SearchNode::new(None));
            gen.set_heuristic(id, Distance::ZERO);
        }
        for &(node, distance) in distances {
            gen.set_distance(node, distance);
        }
        let mut history = GenerationHistory::new(Retention::All);
        history.push(gen);
        history.freeze_live();
        history
    }

    #[test]
    fn decreasing_heuristic_is_computed_once() {
        let analysis = GraphAnalysis::new(&[(0, 1), (1, 2), (2, 3)], &[0], &[3]);
        let mut arg = Arg::new();
        let start = arg.create_init_node(0, false, true);
        let one = arg.create_succ_node(start, 1, false, true);
        arg.set_initialized(true);
        arg.set_expanded(start, true);
        let mut history = frozen(&analysis, arg, &[(start, Distance::Finite(3))]);

        let builder = ArgBuilder::new(analysis);
        let mut stats = IterationStats::default();
        let mut engine = Engine {
            builder: &builder,
            strategy: Decreasing,
            stats: &mut stats,
        };
        let gens = history.generations_mut();
        assert_eq!(engine.ensure_heuristic(gens, 1, start), Distance::Finite(3));
        let first = engine.ensure_heuristic(gens, 1, one);
        assert_eq!(first, Distance::Finite(2));
        assert_eq!(engine.ensure_heuristic(gens, 1, one), first);
        assert_eq!(generation(gens, 1).search_node(one).provider(), Some(one));
        assert!(!generation(gens, 0).distance(one).is_known());
    }

    #[test]
    fn semi_ondemand_heuristic_is_computed_once() {
        let analysis = GraphAnalysis::new(&[(0, 1), (1, 2)], &[0], &[2]);
        let mut arg = Arg::new();
        let start = arg.create_init_node(0, false, true);
        arg.set_initialized(true);
        let mut history = frozen(&analysis, arg, &[]);

        let builder = ArgBuilder::new(analysis);
        let mut stats = IterationStats::default();
        let mut engine = Engine {
            builder: &builder,
            strategy: SemiOndemand,
            stats: &mut stats,
        };
        let gens = history.generations_mut();
        let first = engine.ensure_heuristic(gens, 1, start);
        assert_eq!(first, Distance::Finite(2));
        assert_eq!(engine.stats.nested_searches, 1);
        assert_eq!(engine.stats.expanded, 2);

        assert_eq!(engine.ensure_heuristic(gens, 1, start), first);
        assert_eq!(engine.stats.nested_searches, 1);
        assert_eq!(engine.stats.expanded, 2);
        assert_eq!(generation(gens, 0).distance(start), Distance::Finite(2));
        assert_eq!(generation(gens, 0).arg().len(), 3);
    }

    #[test]
    fn dot_output() {
        let analysis = GraphAnalysis::new(&[(0, 1)], &[0], &[1]);
        let mut arg = Arg::new();
        let start = arg.create_init_node(0, false, true);
        arg.set_initialized(true);
        let (gen, _) = run(analysis, arg, &[], vec![start]);
        insta::assert_snapshot!(gen.to_dot(), @r###"
        digraph generation {
          n0 [label="n0\nh=0 d=1", shape=circle];
          n1 [label="n1\nh=0 d=0", shape=doublecircle];
          n0 -> n1;
        }
        "###);
    }
}
