// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The abstractor: one distance-guided exploration per CEGAR iteration.

use crate::config::{AstarConfig, ConfigError, HeuristicSearchType};
use crate::engine::{generation, generation_mut, Engine};
use crate::generation::Generation;
use crate::history::GenerationHistory;
use crate::stats::IterationStats;
use crate::strategy::{Decreasing, Full, SemiOndemand, Strategy};
use arg::{Analysis, Arg, ArgBuilder};
use std::mem;

/// Outcome of [`AstarAbstractor::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbstractorResult {
    /// The graph has no unexcluded target
    Safe,
    /// The graph contains an abstract counterexample
    Unsafe,
}

impl AbstractorResult {
    pub fn is_safe(self) -> bool {
        self == AbstractorResult::Safe
    }

    pub fn is_unsafe(self) -> bool {
        self == AbstractorResult::Unsafe
    }
}

/// Explores reachability graphs guided by distances computed in earlier
/// iterations.
///
/// The abstractor keeps the graph of every check in its history. Between
/// checks the caller owns the graph and may only prune it (refinement); the
/// next check picks it up again, with node ids unchanged.
pub struct AstarAbstractor<A: Analysis> {
    builder: ArgBuilder<A>,
    config: AstarConfig,
    history: GenerationHistory<A>,
    stats: IterationStats,
    iteration: usize,
}

impl<A: Analysis> AstarAbstractor<A> {
    pub fn new(builder: ArgBuilder<A>, config: AstarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(AstarAbstractor {
            builder,
            config,
            history: GenerationHistory::new(config.search_type.retention()),
            stats: IterationStats::default(),
            iteration: 0,
        })
    }

    /// An empty graph for the first check.
    pub fn create_arg(&self) -> Arg<A::State> {
        self.builder.create_arg()
    }

    pub fn history(&self) -> &GenerationHistory<A> {
        &self.history
    }

    /// Counters of the last check.
    pub fn stats(&self) -> &IterationStats {
        &self.stats
    }

    /// The generation explored by the last check, with its distances.
    pub fn solved_generation(&self) -> Option<&Generation<A>> {
        let live = self.history.live_index()?;
        self.history.get(live.checked_sub(1)?)
    }

    /// Explore `arg` under `prec` until the stop criterion holds.
    pub fn check(&mut self, arg: &mut Arg<A::State>, prec: &A::Prec) -> AbstractorResult {
        match self.config.search_type {
            HeuristicSearchType::Full => self.check_with(Full, arg, prec),
            HeuristicSearchType::SemiOndemand => self.check_with(SemiOndemand, arg, prec),
            HeuristicSearchType::Decreasing => self.check_with(Decreasing, arg, prec),
        }
    }

    fn check_with<St: Strategy>(
        &mut self,
        strategy: St,
        arg: &mut Arg<A::State>,
        prec: &A::Prec,
    ) -> AbstractorResult {
        self.iteration += 1;
        self.stats = IterationStats::new(self.iteration);
        let analysis = self.builder.analysis();

        let mut fresh = vec![];
        let live = match self.history.live_mut() {
            Some(gen) => {
                gen.arg = mem::take(arg);
                gen.prec = prec.clone();
                gen.prune_apply(analysis);
                self.history.len() - 1
            }
            None => {
                fresh = arg.node_ids().collect();
                self.history
                    .push(Generation::new(mem::take(arg), prec.clone(), None))
            }
        };
        log::info!(
            "iteration {}: checking generation {live}",
            self.stats.iteration
        );

        let mut engine = Engine {
            builder: &self.builder,
            strategy,
            stats: &mut self.stats,
        };
        let gens = self.history.generations_mut();
        engine.stats.record_start(generation(gens, live));
        for node in fresh {
            engine.create_search_node(gens, live, node);
        }
        if !generation(gens, live).arg.is_initialized() {
            let gen = generation_mut(gens, live);
            let new_nodes = engine.builder.init(&mut gen.arg, &gen.prec);
            for node in new_nodes {
                engine.create_search_node(gens, live, node);
            }
        }

        let init_nodes = generation(gens, live).arg.init_nodes().to_vec();
        engine.find_distance_for_any(gens, live, init_nodes, self.config.stop_criterion);

        let gen = generation(gens, live);
        engine.stats.record_end(gen);
        let result = if gen.arg.is_safe() {
            AbstractorResult::Safe
        } else {
            AbstractorResult::Unsafe
        };

        let live = self.history.freeze_live();
        strategy.handle_copy(&mut engine, self.history.generations_mut(), live);
        self.history.apply_retention();

        match self.history.live_mut() {
            Some(gen) => *arg = mem::take(&mut gen.arg),
            None => panic!("history lost its live generation"),
        }
        log::info!("{}", self.stats);
        log::info!("iteration {}: {result:?}", self.stats.iteration);
        result
    }
}
