// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Distance-guided exploration of abstract reachability graphs across CEGAR
//! iterations.
//!
//! Every check of the [`AstarAbstractor`](abstractor::AstarAbstractor) works
//! on a [`Generation`](generation::Generation): the reachability graph of the
//! current iteration decorated with heuristics and distances. The heuristic
//! of a node is the distance of its *provider*, the most precise node of the
//! previous generation subsuming it. Since refinement only makes targets
//! harder to reach, such distances are admissible, and the priority search
//! heads straight for the targets that survived the last refinement.
//!
//! Distances are [`Distance::Unknown`](distance::Distance::Unknown) until a
//! search determines them; once known they never change within a generation.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
#![allow(clippy::new_without_default)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod abstractor;
mod commit;
pub mod config;
pub mod distance;
mod engine;
pub mod generation;
pub mod history;
pub mod node;
pub mod search;
pub mod stats;
pub mod stop;
mod strategy;
#[cfg(test)]
mod testing;

pub use abstractor::{AbstractorResult, AstarAbstractor};
pub use config::{AstarConfig, ConfigError, HeuristicSearchType};
pub use distance::Distance;
pub use stop::StopCriterion;
