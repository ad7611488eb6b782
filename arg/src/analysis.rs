// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The abstract domain and transfer functions a reachability graph is built from.

use std::fmt::Debug;
use std::hash::Hash;

/// An abstract domain together with its transfer functions.
///
/// Implementations must be deterministic: the same state and precision always
/// produce the same successors in the same order.
pub trait Analysis {
    /// Abstract states labelling graph nodes.
    type State: Clone + Eq + Debug;
    /// Precision controlling how coarse the computed states are.
    type Prec: Clone + Debug;
    /// Bucket key for covering candidates.
    ///
    /// Two states are only ever compared with [`Analysis::is_leq`] when their
    /// keys are equal.
    type Key: Clone + Eq + Hash + Debug;

    /// The initial abstract states under `prec`.
    fn init_states(&self, prec: &Self::Prec) -> Vec<Self::State>;

    /// The abstract successors of `state` under `prec`.
    fn succ_states(&self, state: &Self::State, prec: &Self::Prec) -> Vec<Self::State>;

    /// Whether `state` may contain an error state.
    fn is_target(&self, state: &Self::State) -> bool;

    /// Whether `state` is empty.
    fn is_bottom(&self, state: &Self::State) -> bool;

    /// The subsumption preorder: every concrete state of `a` is in `b`.
    fn is_leq(&self, a: &Self::State, b: &Self::State) -> bool;

    /// The covering-candidate bucket of `state`.
    fn project(&self, state: &Self::State) -> Self::Key;
}
