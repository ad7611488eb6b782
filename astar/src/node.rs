// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Per-node search data of one generation.

use crate::distance::Distance;
use arg::NodeId;

/// Distance and heuristic of a graph node, plus the corresponding node of
/// the provider generation.
///
/// Both values are write-once: setting a known value again is only allowed
/// with the same value. Every write checks admissibility
/// (`heuristic <= distance`) and that targets sit at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchNode {
    provider: Option<NodeId>,
    heuristic: Distance,
    distance: Distance,
}

impl SearchNode {
    pub fn new(provider: Option<NodeId>) -> Self {
        SearchNode {
            provider,
            heuristic: Distance::Unknown,
            distance: Distance::Unknown,
        }
    }

    /// The node in the provider generation this node's heuristic comes from.
    pub fn provider(&self) -> Option<NodeId> {
        self.provider
    }

    pub fn set_provider(&mut self, provider: Option<NodeId>) {
        self.provider = provider;
    }

    pub fn heuristic(&self) -> Distance {
        self.heuristic
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn set_heuristic(&mut self, value: Distance, target: bool) {
        assert!(value.is_known(), "heuristic cannot be set to unknown");
        if self.heuristic.is_known() {
            assert_eq!(
                self.heuristic, value,
                "heuristic already known with a different value"
            );
            return;
        }
        if target {
            assert_eq!(value, Distance::ZERO, "heuristic of a target must be 0");
        }
        self.heuristic = value;
        self.check_admissibility();
    }

    pub fn set_distance(&mut self, value: Distance, target: bool) {
        assert!(value.is_known(), "distance cannot be set to unknown");
        if self.distance.is_known() {
            assert_eq!(
                self.distance, value,
                "distance already known with a different value"
            );
            return;
        }
        if target {
            assert_eq!(value, Distance::ZERO, "distance of a target must be 0");
        }
        self.distance = value;
        self.check_admissibility();
    }

    /// Forget heuristic and distance, keeping the provider.
    pub fn reset(&mut self) {
        self.heuristic = Distance::Unknown;
        self.distance = Distance::Unknown;
    }

    fn check_admissibility(&self) {
        if self.heuristic.is_known() && self.distance.is_known() {
            assert!(
                self.heuristic <= self.distance,
                "heuristic {} overestimates distance {}",
                self.heuristic,
                self.distance
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_once() {
        let mut node = SearchNode::new(None);
        node.set_heuristic(Distance::Finite(2), false);
        node.set_heuristic(Distance::Finite(2), false);
        node.set_distance(Distance::Finite(3), false);
        assert_eq!(node.heuristic(), Distance::Finite(2));
        assert_eq!(node.distance(), Distance::Finite(3));
        node.reset();
        assert!(!node.heuristic().is_known());
        assert!(!node.distance().is_known());
    }

    #[test]
    fn infinite_distance_admits_anything() {
        let mut node = SearchNode::new(None);
        node.set_distance(Distance::Infinite, false);
        node.set_heuristic(Distance::Finite(40), false);
        node.set_heuristic(Distance::Finite(40), false);
    }

    #[test]
    #[should_panic(expected = "overestimates")]
    fn inadmissible() {
        let mut node = SearchNode::new(None);
        node.set_heuristic(Distance::Finite(4), false);
        node.set_distance(Distance::Finite(3), false);
    }

    #[test]
    #[should_panic(expected = "different value")]
    fn heuristic_changes() {
        let mut node = SearchNode::new(None);
        node.set_heuristic(Distance::Finite(1), false);
        node.set_heuristic(Distance::Finite(2), false);
    }

    #[test]
    #[should_panic(expected = "target")]
    fn target_not_zero() {
        let mut node = SearchNode::new(None);
        node.set_distance(Distance::Finite(1), true);
    }
}
