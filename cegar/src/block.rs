// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Predicate-free abstraction of explicit systems by partitioning their
//! states into blocks.

use crate::system::{ExplicitSystem, StateSet};
use arg::Analysis;
use itertools::Itertools;
use std::fmt;
use std::sync::Arc;

/// An abstract state: the set of concrete states it stands for.
pub type Block = StateSet;

/// The precision: a partition of the concrete states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    blocks: Vec<Block>,
}

impl Partition {
    /// The coarsest partition that still tells targets apart.
    pub fn initial(system: &ExplicitSystem) -> Self {
        let (targets, others): (Block, Block) = system
            .all_states()
            .into_iter()
            .partition(|&s| system.is_target(s));
        Partition {
            blocks: [others, targets]
                .into_iter()
                .filter(|b| !b.is_empty())
                .collect(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks meeting `states`.
    pub fn blocks_meeting<'a>(
        &'a self,
        states: &'a StateSet,
    ) -> impl Iterator<Item = &'a Block> {
        self.blocks.iter().filter(move |b| !b.is_disjoint(states))
    }

    /// Split every block into its part inside `by` and its part outside.
    pub fn split(&self, by: &StateSet) -> Partition {
        let mut blocks = vec![];
        for block in &self.blocks {
            let (inside, outside): (Block, Block) =
                block.iter().copied().partition(|s| by.contains(s));
            blocks.extend([inside, outside].into_iter().filter(|b| !b.is_empty()));
        }
        Partition { blocks }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks = self
            .blocks
            .iter()
            .map(|b| format!("{{{}}}", b.iter().join(", ")))
            .join(" ");
        write!(f, "{blocks}")
    }
}

/// The analysis over [`Block`]s of an [`ExplicitSystem`].
///
/// Blocks of different partitions are compared by inclusion, so all nodes
/// share a single projection bucket.
#[derive(Clone, Debug)]
pub struct BlockAnalysis {
    system: Arc<ExplicitSystem>,
}

impl BlockAnalysis {
    pub fn new(system: Arc<ExplicitSystem>) -> Self {
        BlockAnalysis { system }
    }

    pub fn system(&self) -> &ExplicitSystem {
        &self.system
    }
}

impl Analysis for BlockAnalysis {
    type State = Block;
    type Prec = Partition;
    type Key = ();

    fn init_states(&self, prec: &Partition) -> Vec<Block> {
        prec.blocks_meeting(self.system.init()).cloned().collect()
    }

    fn succ_states(&self, state: &Block, prec: &Partition) -> Vec<Block> {
        let image = self.system.post(state);
        prec.blocks_meeting(&image).cloned().collect()
    }

    fn is_target(&self, state: &Block) -> bool {
        !state.is_disjoint(self.system.targets())
    }

    fn is_bottom(&self, state: &Block) -> bool {
        state.is_empty()
    }

    fn is_leq(&self, a: &Block, b: &Block) -> bool {
        a.is_subset(b)
    }

    fn project(&self, _: &Block) {}
}
