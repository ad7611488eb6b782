// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration of the distance-guided abstractor.

use crate::history::Retention;
use crate::stop::StopCriterion;
use thiserror::Error;

/// Default values for [`AstarConfig`].
pub mod defaults {
    use super::*;

    pub const SEARCH_TYPE: HeuristicSearchType = HeuristicSearchType::Decreasing;
    pub const STOP_CRITERION: StopCriterion = StopCriterion::FirstCex;
}

/// How heuristics are obtained for nodes whose provider has no known distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeuristicSearchType {
    /// Explore everything and compute every distance from the targets
    /// backwards. Heuristics are always inherited.
    Full,
    /// Run a nested search in the provider generation.
    SemiOndemand,
    /// Derive the heuristic from the tree parent's heuristic.
    Decreasing,
}

impl HeuristicSearchType {
    /// Which generations need to be kept around.
    pub fn retention(self) -> Retention {
        match self {
            HeuristicSearchType::SemiOndemand => Retention::All,
            HeuristicSearchType::Full | HeuristicSearchType::Decreasing => Retention::Previous,
        }
    }
}

/// A configuration that cannot be run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Full search computes distances from all targets, so it has to see all of them
    #[error("full heuristic search requires the full-exploration stop criterion, got {0:?}")]
    FullRequiresFullExploration(StopCriterion),
    /// The criterion is reserved for searches inside older generations
    #[error("stop criterion {0:?} is only used by nested searches")]
    NestedOnly(StopCriterion),
}

/// Settings of an [`AstarAbstractor`](crate::abstractor::AstarAbstractor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AstarConfig {
    pub search_type: HeuristicSearchType,
    pub stop_criterion: StopCriterion,
}

impl Default for AstarConfig {
    fn default() -> Self {
        AstarConfig {
            search_type: defaults::SEARCH_TYPE,
            stop_criterion: defaults::STOP_CRITERION,
        }
    }
}

impl AstarConfig {
    /// A validated configuration.
    pub fn new(
        search_type: HeuristicSearchType,
        stop_criterion: StopCriterion,
    ) -> Result<Self, ConfigError> {
        let config = AstarConfig {
            search_type,
            stop_criterion,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stop_criterion == StopCriterion::DistanceKnowable {
            return Err(ConfigError::NestedOnly(self.stop_criterion));
        }
        if self.search_type == HeuristicSearchType::Full
            && self.stop_criterion != StopCriterion::FullExploration
        {
            return Err(ConfigError::FullRequiresFullExploration(
                self.stop_criterion,
            ));
        }
        Ok(())
    }
}
