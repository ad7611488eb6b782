// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

use astar::{AstarConfig, HeuristicSearchType, StopCriterion};
use cegar::{check_system, ExplicitSystem};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn config(search_type: HeuristicSearchType, stop: StopCriterion) -> AstarConfig {
    AstarConfig::new(search_type, stop).unwrap()
}

pub fn ring_benchmark(c: &mut Criterion) {
    let safe = ExplicitSystem::ring(64, None);
    let unsafe_ = ExplicitSystem::ring(64, Some(40));
    let configs = [
        ("decreasing", config(HeuristicSearchType::Decreasing, StopCriterion::FirstCex)),
        ("semi-ondemand", config(HeuristicSearchType::SemiOndemand, StopCriterion::FirstCex)),
        ("full", config(HeuristicSearchType::Full, StopCriterion::FullExploration)),
    ];
    for (name, config) in configs {
        c.bench_function(&format!("cegar::ring64-safe {name}"), |b| {
            b.iter(|| check_system(black_box(safe.clone()), config))
        });
        c.bench_function(&format!("cegar::ring64-unsafe {name}"), |b| {
            b.iter(|| check_system(black_box(unsafe_.clone()), config))
        });
    }
}

criterion_group!(benches, ring_benchmark);
criterion_main!(benches);
