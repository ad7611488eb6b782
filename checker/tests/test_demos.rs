// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use cegar::ExplicitSystem;
use walkdir::WalkDir;

const SEARCHES_TO_TEST: [(&str, &str); 3] = [
    ("decreasing", "first-cex"),
    ("semi-ondemand", "first-cex"),
    ("full", "full-exploration"),
];

fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos")
}

fn get_demos() -> Vec<PathBuf> {
    WalkDir::new(demo_dir())
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new("json"))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_astar-checker"))
        .args(args)
        .output()
        .expect("could not run checker")
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).expect("non-utf8 output")
}

fn stderr(out: &Output) -> String {
    String::from_utf8(out.stderr.clone()).expect("non-utf8 output")
}

#[test]
fn demos_exit_status() {
    for (search, stop) in SEARCHES_TO_TEST {
        for path in get_demos() {
            println!("Running {} with {search}", path.display());
            let system = ExplicitSystem::load(&path).unwrap();
            let out = run(&[
                "check",
                &format!("--search={search}"),
                &format!("--stop={stop}"),
                path.to_str().unwrap(),
            ]);
            let expected = if system.is_safe() { 0 } else { 1 };
            assert_eq!(
                out.status.code(),
                Some(expected),
                "wrong answer for {} with {search}",
                path.display()
            );
        }
    }
}

#[test]
fn detour_counterexample() {
    let path = demo_dir().join("detour.json");
    let out = run(&["check", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    insta::assert_display_snapshot!(stdout(&out), @r###"
    unsafe
    counterexample: 0 -> 1 -> 2 -> 3 -> 6
    "###);
}

#[test]
fn counter_is_safe() {
    let path = demo_dir().join("counter.json");
    let out = run(&["check", "--search=semi-ondemand", path.to_str().unwrap()]);
    assert!(out.status.success());
    insta::assert_display_snapshot!(stdout(&out), @"safe");
}

#[test]
fn print_round_trips() {
    let path = demo_dir().join("mutex.json");
    let out = run(&["print", path.to_str().unwrap()]);
    assert!(out.status.success());
    let reprinted = ExplicitSystem::from_json(&stdout(&out)).unwrap();
    assert_eq!(reprinted, ExplicitSystem::load(&path).unwrap());
}

#[test]
fn dot_output() {
    let path = demo_dir().join("ladder.json");
    let dot = std::env::temp_dir().join(format!("astar-checker-{}.dot", std::process::id()));
    let out = run(&[
        "check",
        "--dot",
        dot.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    let contents = std::fs::read_to_string(&dot).unwrap();
    assert!(contents.starts_with("digraph generation {"));
    assert!(contents.contains("shape=doublecircle"));
    std::fs::remove_file(dot).unwrap();
}

#[test]
fn input_errors() {
    let out = run(&["check", "no-such-file.json"]);
    assert_eq!(out.status.code(), Some(2));
    insta::assert_display_snapshot!(
        stderr(&out),
        @"could not read no-such-file.json: No such file or directory (os error 2)"
    );

    let path = demo_dir().join("counter.json");
    let out = run(&["check", "--search=full", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    insta::assert_display_snapshot!(
        stderr(&out),
        @"full heuristic search requires the full-exploration stop criterion, got FirstCex"
    );

    let huge = std::env::temp_dir().join(format!("astar-checker-huge-{}.json", std::process::id()));
    std::fs::write(
        &huge,
        r#"{"states": 4000000000, "init": [0], "edges": [], "targets": []}"#,
    )
    .unwrap();
    let out = run(&["print", huge.to_str().unwrap()]);
    std::fs::remove_file(&huge).unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("at most 1048576 are supported"));
}
