// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! When a search run may stop.

use arg::{Arg, NodeId};

/// Decides, from the nodes reached so far, whether a search may stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopCriterion {
    /// Stop at the first reached target that is not excluded
    FirstCex,
    /// Never stop early
    FullExploration,
    /// Stop as soon as any node is reached, since its distance then
    /// determines the distance of the start node. Only used by nested
    /// searches in older generations.
    DistanceKnowable,
}

impl StopCriterion {
    pub fn can_stop<S>(self, arg: &Arg<S>, reached: &[NodeId]) -> bool {
        match self {
            StopCriterion::FirstCex => reached
                .iter()
                .any(|&n| arg.is_target(n) && !arg.is_excluded(n)),
            StopCriterion::FullExploration => false,
            StopCriterion::DistanceKnowable => !reached.is_empty(),
        }
    }
}
