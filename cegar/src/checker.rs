// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The CEGAR loop.

use crate::block::{Block, BlockAnalysis, Partition};
use crate::refiner::{RefinerResult, TraceRefiner};
use crate::system::ExplicitSystem;
use arg::{Arg, ArgBuilder};
use astar::{AstarAbstractor, AstarConfig, ConfigError};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The answer of the CEGAR loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SafetyResult {
    /// No target is reachable
    Safe,
    /// A concrete path from an init state to a target
    Unsafe(Vec<u32>),
}

/// What the CEGAR loop spent its time on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CegarStatistics {
    pub iterations: usize,
    pub abstractor_time: Duration,
    pub refiner_time: Duration,
    /// Nodes expanded by the abstractor, over all iterations
    pub expanded: usize,
    /// Size of the final partition
    pub blocks: usize,
}

impl fmt::Display for CegarStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "iterations: {}", self.iterations)?;
        writeln!(f, "expanded:   {}", self.expanded)?;
        writeln!(f, "blocks:     {}", self.blocks)?;
        writeln!(
            f,
            "abstractor: {:0.3}s",
            self.abstractor_time.as_secs_f64()
        )?;
        write!(f, "refiner:    {:0.3}s", self.refiner_time.as_secs_f64())
    }
}

/// Alternates distance-guided abstraction with trace refinement.
pub struct CegarChecker {
    abstractor: AstarAbstractor<BlockAnalysis>,
    refiner: TraceRefiner,
    arg: Arg<Block>,
    statistics: CegarStatistics,
}

impl CegarChecker {
    pub fn new(system: Arc<ExplicitSystem>, config: AstarConfig) -> Result<Self, ConfigError> {
        let builder = ArgBuilder::new(BlockAnalysis::new(system.clone()));
        let abstractor = AstarAbstractor::new(builder, config)?;
        let arg = abstractor.create_arg();
        Ok(CegarChecker {
            abstractor,
            refiner: TraceRefiner::new(system),
            arg,
            statistics: CegarStatistics::default(),
        })
    }

    pub fn abstractor(&self) -> &AstarAbstractor<BlockAnalysis> {
        &self.abstractor
    }

    /// The graph as left by the last iteration.
    pub fn arg(&self) -> &Arg<Block> {
        &self.arg
    }

    pub fn statistics(&self) -> &CegarStatistics {
        &self.statistics
    }

    /// Run the loop from `prec` until the system is proven safe or a
    /// counterexample is found.
    pub fn check(&mut self, prec: Partition) -> SafetyResult {
        let mut prec = prec;
        loop {
            self.statistics.iterations += 1;
            self.statistics.blocks = prec.len();
            log::info!(
                "CEGAR iteration {} with {} blocks",
                self.statistics.iterations,
                prec.len()
            );

            let start = Instant::now();
            let result = self.abstractor.check(&mut self.arg, &prec);
            self.statistics.abstractor_time += start.elapsed();
            self.statistics.expanded += self.abstractor.stats().expanded;
            if result.is_safe() {
                log::info!("abstraction is safe");
                return SafetyResult::Safe;
            }

            let start = Instant::now();
            let refined = self.refiner.refine(&mut self.arg, &prec);
            self.statistics.refiner_time += start.elapsed();
            match refined {
                RefinerResult::Unsafe(trace) => return SafetyResult::Unsafe(trace),
                RefinerResult::Spurious(next) => prec = next,
            }
        }
    }
}

/// Check `system` starting from the coarsest partition.
pub fn check_system(
    system: ExplicitSystem,
    config: AstarConfig,
) -> Result<(SafetyResult, CegarStatistics), ConfigError> {
    let system = Arc::new(system);
    let prec = Partition::initial(&system);
    let mut checker = CegarChecker::new(system, config)?;
    let result = checker.check(prec);
    Ok((result, checker.statistics().clone()))
}
