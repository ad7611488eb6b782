// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The astar-checker binary's command-line interface.

use std::sync::Arc;
use std::{fs, process};

use astar::{AstarConfig, HeuristicSearchType, StopCriterion};
use cegar::block::Partition;
use cegar::{CegarChecker, ExplicitSystem, SafetyResult};
use clap::Args;
use itertools::Itertools;

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum SearchType {
    Decreasing,
    SemiOndemand,
    Full,
}

impl From<SearchType> for HeuristicSearchType {
    fn from(search: SearchType) -> Self {
        match search {
            SearchType::Decreasing => HeuristicSearchType::Decreasing,
            SearchType::SemiOndemand => HeuristicSearchType::SemiOndemand,
            SearchType::Full => HeuristicSearchType::Full,
        }
    }
}

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum Stop {
    FirstCex,
    FullExploration,
}

impl From<Stop> for StopCriterion {
    fn from(stop: Stop) -> Self {
        match stop {
            Stop::FirstCex => StopCriterion::FirstCex,
            Stop::FullExploration => StopCriterion::FullExploration,
        }
    }
}

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct CheckArgs {
    #[arg(value_enum, long, default_value_t = SearchType::Decreasing)]
    /// How nodes of a new iteration get their heuristics when the previous
    /// iteration did not compute a distance for them
    search: SearchType,

    #[arg(value_enum, long, default_value_t = Stop::FirstCex)]
    /// When an abstraction run may stop
    stop: Stop,

    #[arg(long)]
    /// Print timing statistics
    time: bool,

    #[arg(long)]
    /// Write the last explored graph with its distances in Graphviz format
    dot: Option<String>,

    /// File name for a .json system
    file: String,
}

#[derive(clap::Subcommand, Clone, Debug, PartialEq, Eq)]
enum Command {
    /// Check that no target state is reachable, with distance-guided CEGAR.
    Check(CheckArgs),
    /// Parse, validate and re-print a system (for debugging)
    Print {
        /// File name for a .json system
        file: String,
    },
}

impl Command {
    fn file(&self) -> &str {
        match self {
            Command::Check(CheckArgs { file, .. }) => file,
            Command::Print { file } => file,
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(about, long_about=None)]
/// Entrypoint for the astar-checker binary, including all commands.
pub struct App {
    #[command(subcommand)]
    /// Command to run
    command: Command,
}

impl App {
    /// Run the application.
    ///
    /// Exits with status 1 if the system is unsafe and 2 if the input or the
    /// configuration is invalid.
    pub fn exec(self) {
        let system = match ExplicitSystem::load(self.command.file()) {
            Ok(system) => system,
            Err(err) => {
                eprintln!("{err}");
                process::exit(2);
            }
        };
        log::info!(
            "loaded {} with {} states and {} edges",
            self.command.file(),
            system.states(),
            system.edges().len()
        );

        match self.command {
            Command::Print { .. } => println!("{}", system.to_json()),
            Command::Check(ref args) => {
                let config = match AstarConfig::new(args.search.into(), args.stop.into()) {
                    Ok(config) => config,
                    Err(err) => {
                        eprintln!("{err}");
                        process::exit(2);
                    }
                };
                let system = Arc::new(system);
                let mut checker = match CegarChecker::new(system.clone(), config) {
                    Ok(checker) => checker,
                    Err(err) => {
                        eprintln!("{err}");
                        process::exit(2);
                    }
                };
                let result = checker.check(Partition::initial(&system));

                if let Some(path) = &args.dot {
                    if let Some(gen) = checker.abstractor().solved_generation() {
                        if let Err(err) = fs::write(path, gen.to_dot()) {
                            eprintln!("could not write {path}: {err}");
                            process::exit(2);
                        }
                    }
                }
                if args.time {
                    eprintln!("{}", checker.statistics());
                }

                match result {
                    SafetyResult::Safe => println!("safe"),
                    SafetyResult::Unsafe(trace) => {
                        println!("unsafe");
                        println!("counterexample: {}", trace.iter().join(" -> "));
                        process::exit(1);
                    }
                }
            }
        }
    }
}
