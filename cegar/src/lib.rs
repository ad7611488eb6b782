// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! CEGAR over explicit finite transition systems, with the distance-guided
//! abstractor of the `astar` crate.
//!
//! Abstract states are blocks of a partition of the concrete states. A
//! spurious counterexample splits the partition and prunes the graph at the
//! step where the concrete replay died out, so later iterations reuse the
//! rest of the graph and the distances computed on it.

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

pub mod block;
pub mod checker;
pub mod refiner;
pub mod system;

pub use checker::{check_system, CegarChecker, CegarStatistics, SafetyResult};
pub use system::{ExplicitSystem, SystemError};
