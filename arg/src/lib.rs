// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Abstract reachability graphs and the analysis interface used to grow them.
//!
//! An [`Arg`](graph::Arg) is a tree of abstract states with additional
//! covering (subsumption) edges. The [`ArgBuilder`](builder::ArgBuilder) is
//! the only place that consults an [`Analysis`](analysis::Analysis) to create
//! nodes.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
#![allow(clippy::new_without_default)]
#![deny(clippy::uninlined_format_args)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analysis;
pub mod builder;
pub mod graph;
pub mod hashmap;

pub use analysis::Analysis;
pub use builder::ArgBuilder;
pub use graph::{Arg, ArgNode, NodeId};
