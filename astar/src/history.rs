// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The generations of all CEGAR iterations seen so far.

use crate::generation::Generation;
use arg::Analysis;

/// Which older generations survive an iteration replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retention {
    /// Keep every generation; nested searches may reach arbitrarily far back
    All,
    /// Keep only the generation providing for the live one
    Previous,
}

/// Generations indexed by iteration, oldest first.
///
/// The live generation, the one the next check works on, is always the last
/// entry. Dropped generations leave an empty slot so indices stay valid.
pub struct GenerationHistory<A: Analysis> {
    generations: Vec<Option<Generation<A>>>,
    retention: Retention,
}

impl<A: Analysis> GenerationHistory<A> {
    pub fn new(retention: Retention) -> Self {
        GenerationHistory {
            generations: vec![],
            retention,
        }
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Number of slots, including dropped generations.
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Number of generations still held.
    pub fn retained(&self) -> usize {
        self.generations.iter().flatten().count()
    }

    pub fn get(&self, idx: usize) -> Option<&Generation<A>> {
        self.generations.get(idx).and_then(Option::as_ref)
    }

    pub fn live_index(&self) -> Option<usize> {
        self.generations.len().checked_sub(1)
    }

    pub fn live(&self) -> Option<&Generation<A>> {
        self.generations.last().and_then(Option::as_ref)
    }

    pub(crate) fn live_mut(&mut self) -> Option<&mut Generation<A>> {
        self.generations.last_mut().and_then(Option::as_mut)
    }

    pub(crate) fn push(&mut self, generation: Generation<A>) -> usize {
        self.generations.push(Some(generation));
        self.generations.len() - 1
    }

    pub(crate) fn generations_mut(&mut self) -> &mut [Option<Generation<A>>] {
        &mut self.generations
    }

    /// Freeze the live generation: a structural copy takes its place in the
    /// history, and the live generation, reset, moves one slot up with the
    /// copy as its provider. Returns the new live index.
    pub(crate) fn freeze_live(&mut self) -> usize {
        let mut live = match self.generations.pop() {
            Some(Some(live)) => live,
            _ => panic!("no live generation to freeze"),
        };
        let copy = live.structural_copy();
        let copy_idx = self.push(copy);
        live.reset_onto(copy_idx);
        self.push(live)
    }

    /// Drop what the retention policy does not keep.
    pub(crate) fn apply_retention(&mut self) {
        if self.retention == Retention::All || self.generations.len() < 2 {
            return;
        }
        let copy_idx = self.generations.len() - 2;
        for slot in &mut self.generations[..copy_idx] {
            *slot = None;
        }
        if let Some(copy) = self.generations[copy_idx].as_mut() {
            copy.release_provider();
        }
    }
}
