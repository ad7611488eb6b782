// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Explicit finite transition systems.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

/// A set of concrete states.
pub type StateSet = BTreeSet<u32>;

/// Largest number of states a system may declare. Adjacency lists and
/// partitions are allocated per state.
pub const MAX_STATES: u32 = 1 << 20;

/// A system that cannot be loaded.
#[derive(Debug, Error)]
pub enum SystemError {
    /// The file could not be read
    #[error("could not read {path}: {source}")]
    Io {
        /// The file
        path: String,
        /// The underlying error
        #[source]
        source: io::Error,
    },
    /// The contents are not a system
    #[error("could not parse system: {0}")]
    Json(#[from] serde_json::Error),
    /// An init state, edge endpoint or target is not below `states`
    #[error("state {state} is out of range (the system has {states} states)")]
    UnknownState {
        /// The offending state
        state: u32,
        /// Number of states of the system
        states: u32,
    },
    /// There is nothing to check
    #[error("the system has no states")]
    Empty,
    /// More states than [`MAX_STATES`]
    #[error("the system has {0} states, at most {max} are supported", max = MAX_STATES)]
    TooLarge(u32),
}

/// States are `0..states`; `edges` is the transition relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSystem", into = "RawSystem")]
pub struct ExplicitSystem {
    states: u32,
    init: StateSet,
    edges: Vec<(u32, u32)>,
    targets: StateSet,
    succs: Vec<Vec<u32>>,
}

/// The serialized form, without the adjacency lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawSystem {
    states: u32,
    init: Vec<u32>,
    edges: Vec<(u32, u32)>,
    targets: Vec<u32>,
}

impl TryFrom<RawSystem> for ExplicitSystem {
    type Error = SystemError;

    fn try_from(raw: RawSystem) -> Result<Self, SystemError> {
        ExplicitSystem::new(raw.states, &raw.init, &raw.edges, &raw.targets)
    }
}

impl From<ExplicitSystem> for RawSystem {
    fn from(system: ExplicitSystem) -> Self {
        RawSystem {
            states: system.states,
            init: system.init.into_iter().collect(),
            edges: system.edges,
            targets: system.targets.into_iter().collect(),
        }
    }
}

impl ExplicitSystem {
    pub fn new(
        states: u32,
        init: &[u32],
        edges: &[(u32, u32)],
        targets: &[u32],
    ) -> Result<Self, SystemError> {
        if states == 0 {
            return Err(SystemError::Empty);
        }
        if states > MAX_STATES {
            return Err(SystemError::TooLarge(states));
        }
        let mentioned = init
            .iter()
            .chain(targets)
            .chain(edges.iter().flat_map(|(from, to)| [from, to]));
        for &state in mentioned {
            if state >= states {
                return Err(SystemError::UnknownState { state, states });
            }
        }
        let mut succs = vec![vec![]; states as usize];
        for &(from, to) in edges {
            if !succs[from as usize].contains(&to) {
                succs[from as usize].push(to);
            }
        }
        Ok(ExplicitSystem {
            states,
            init: init.iter().copied().collect(),
            edges: edges.to_vec(),
            targets: targets.iter().copied().collect(),
            succs,
        })
    }

    pub fn from_json(s: &str) -> Result<Self, SystemError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SystemError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SystemError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("could not serialize system")
    }

    /// A cycle `0 -> 1 -> ... -> size - 1 -> 0` with chords `i -> i + 2`
    /// from even states, starting at 0. The target, if any, is hung off the
    /// ring as an extra state reachable from `target_after`.
    pub fn ring(size: u32, target_after: Option<u32>) -> Self {
        let mut edges: Vec<(u32, u32)> = (0..size).map(|i| (i, (i + 1) % size)).collect();
        edges.extend((0..size).step_by(2).map(|i| (i, (i + 2) % size)));
        let mut targets = vec![];
        if let Some(from) = target_after {
            edges.push((from, size));
            targets.push(size);
        }
        match ExplicitSystem::new(size + 1, &[0], &edges, &targets) {
            Ok(system) => system,
            Err(err) => panic!("invalid ring of size {size}: {err}"),
        }
    }

    pub fn states(&self) -> u32 {
        self.states
    }

    pub fn all_states(&self) -> StateSet {
        (0..self.states).collect()
    }

    pub fn init(&self) -> &StateSet {
        &self.init
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    pub fn targets(&self) -> &StateSet {
        &self.targets
    }

    pub fn is_target(&self, state: u32) -> bool {
        self.targets.contains(&state)
    }

    pub fn successors(&self, state: u32) -> &[u32] {
        &self.succs[state as usize]
    }

    /// The image of `states` under the transition relation.
    pub fn post(&self, states: &StateSet) -> StateSet {
        states
            .iter()
            .flat_map(|&s| self.successors(s).iter().copied())
            .collect()
    }

    /// The concrete states reachable along `blocks`: the first set holds the
    /// init states in `blocks[0]`, each further set the successors of the
    /// previous one inside the next block. Stops after the first empty set.
    pub fn replay<'a>(&self, blocks: impl IntoIterator<Item = &'a StateSet>) -> Vec<StateSet> {
        let mut reach: Vec<StateSet> = vec![];
        for block in blocks {
            let next: StateSet = match reach.last() {
                None => self.init.intersection(block).copied().collect(),
                Some(previous) => self.post(previous).intersection(block).copied().collect(),
            };
            let empty = next.is_empty();
            reach.push(next);
            if empty {
                break;
            }
        }
        reach
    }

    /// A concrete path through `blocks` ending in a target, if there is one.
    pub fn concrete_trace<'a>(
        &self,
        blocks: impl IntoIterator<Item = &'a StateSet>,
    ) -> Option<Vec<u32>> {
        let blocks: Vec<&StateSet> = blocks.into_iter().collect();
        let reach = self.replay(blocks.iter().copied());
        if reach.len() != blocks.len() {
            return None;
        }
        let last = reach.last()?;
        let mut state = *last.iter().find(|&&s| self.is_target(s))?;
        let mut trace = vec![state];
        for previous in reach.iter().rev().skip(1) {
            state = *previous
                .iter()
                .find(|&&p| self.successors(p).contains(&state))?;
            trace.push(state);
        }
        trace.reverse();
        Some(trace)
    }

    /// Length of a shortest path from `from` to a target.
    pub fn shortest_target_distance(&self, from: u32) -> Option<u32> {
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([(from, 0)]);
        while let Some((state, depth)) = queue.pop_front() {
            if self.is_target(state) {
                return Some(depth);
            }
            for &next in self.successors(state) {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        None
    }

    /// No target is reachable from an init state.
    pub fn is_safe(&self) -> bool {
        self.init
            .iter()
            .all(|&s| self.shortest_target_distance(s).is_none())
    }

    /// `trace` starts in an init state, follows edges and ends in a target.
    pub fn is_counterexample(&self, trace: &[u32]) -> bool {
        match (trace.first(), trace.last()) {
            (Some(first), Some(&last)) => {
                self.init.contains(first)
                    && self.is_target(last)
                    && trace
                        .windows(2)
                        .all(|w| self.successors(w[0]).contains(&w[1]))
            }
            _ => false,
        }
    }
}
