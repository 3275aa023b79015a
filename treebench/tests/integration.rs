//! Integration tests for Treebench
//!
//! These tests verify the end-to-end behavior over real directory trees.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use treebench::{
    BuildStep, LeafOutcome, LeafRunner, LeafStatus, PlainStyle, ProgramCommand, SamplerConfig,
    Settings, StatsConfig, TestTree, TimeUnit, TreeError, TreeReporter, leaf_name, list_tests,
    run_tests, summarize,
};

/// Create `resources/a/x.test` and `resources/a/b/y.test`
fn make_resources() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("resources");
    fs::create_dir_all(root.join("a/b")).unwrap();
    fs::write(root.join("a/x.test"), "echo x\n").unwrap();
    fs::write(root.join("a/b/y.test"), "echo y\n").unwrap();
    (dir, root)
}

fn settings(root: &Path, program: &str) -> Settings {
    let program = ProgramCommand::new(program);
    Settings {
        root: root.to_path_buf(),
        filter: None,
        timed: program.clone(),
        program,
        reference: None,
        sampler: SamplerConfig {
            time_budget: Duration::from_millis(1),
            min_samples: 5,
            max_samples: Some(8),
        },
        stats: StatsConfig::default(),
        fail_on_mismatch: false,
        build: Vec::new(),
    }
}

fn run(settings: &Settings) -> (String, treebench::RunTally) {
    let mut buf = Vec::new();
    let tally = run_tests(settings, &mut buf, &PlainStyle, false).unwrap();
    (String::from_utf8(buf).unwrap(), tally)
}

/// Test that the outline mirrors the directory layout
#[test]
fn test_outline_order_and_indentation() {
    struct Recorder(Vec<String>);
    impl LeafRunner for Recorder {
        fn run_leaf(&mut self, path: &Path) -> LeafOutcome {
            self.0.push(leaf_name(path));
            LeafOutcome {
                verdict: None,
                status: LeafStatus::Measured(summarize(&[1.0, 2.0, 3.0], 0.95).unwrap()),
            }
        }
    }

    let (_dir, root) = make_resources();
    let tree = TestTree::discover(&root).unwrap();
    let mut runner = Recorder(Vec::new());
    let mut buf = Vec::new();

    let tally = TreeReporter::new(&mut buf, &PlainStyle, StatsConfig::default())
        .report("resources", &tree, &mut runner)
        .unwrap();

    let out = String::from_utf8(buf).unwrap();
    let expected = "\
resources
  \u{2514} a
    \u{2514} x.test 2.000 \u{00B1} 2.484 seconds (n=3)
    \u{2514} b
      \u{2514} y.test 2.000 \u{00B1} 2.484 seconds (n=3)
";
    assert_eq!(out, expected);
    assert_eq!(runner.0, vec!["x.test", "y.test"]);
    assert_eq!(tally.leaves, 2);
    assert_eq!(tally.directories, 3);
}

/// Test a full timing run against a real executable
#[cfg(unix)]
#[test]
fn test_timing_run() {
    let (_dir, root) = make_resources();
    let (out, tally) = run(&settings(&root, "true"));

    let leaf = Regex::new(r"^ +\u{2514} [xy]\.test \d+\.\d{3} \u{00B1} \d+\.\d{3} seconds \(n=[5-8]\)$")
        .unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "resources");
    assert!(leaf.is_match(lines[2]), "unexpected line: {}", lines[2]);
    assert!(leaf.is_match(lines[4]), "unexpected line: {}", lines[4]);
    assert_eq!(tally.errored, 0);
    assert!(tally.is_success(true));
}

/// Test that display settings change units and rounding only
#[cfg(unix)]
#[test]
fn test_display_unit_and_digits() {
    let (_dir, root) = make_resources();
    let mut settings = settings(&root, "true");
    settings.stats.time_unit = TimeUnit::Milliseconds;
    settings.stats.round_digits = 1;

    let (out, _) = run(&settings);
    let leaf = Regex::new(r"x\.test \d+\.\d \u{00B1} \d+\.\d milliseconds \(n=\d+\)$").unwrap();
    assert!(out.lines().any(|l| leaf.is_match(l)), "output was:\n{}", out);
}

/// Test differential mode verdicts and the mismatch exit policy
#[cfg(unix)]
#[test]
fn test_differential_run() {
    let (_dir, root) = make_resources();

    let mut same = settings(&root, "cat");
    same.reference = Some(ProgramCommand::new("cat"));
    let (out, tally) = run(&same);
    assert_eq!(tally.passed, 2);
    assert!(out.contains("\u{2514} [PASS] x.test "));
    assert!(tally.is_success(true));

    // `cat` prints the script, `sh` runs it
    let mut differ = settings(&root, "sh");
    differ.reference = Some(ProgramCommand::new("cat"));
    let (out, tally) = run(&differ);
    assert_eq!(tally.failed, 2);
    assert_eq!(tally.errored, 0);
    assert!(out.contains("\u{2514} [FAIL] y.test "));
    assert!(tally.is_success(false));
    assert!(!tally.is_success(true));
}

/// Test that a missing executable errors each leaf without stopping traversal
#[test]
fn test_missing_program_reports_inline() {
    let (_dir, root) = make_resources();
    let (out, tally) = run(&settings(&root, "./no-such-program-e41c"));

    assert_eq!(tally.leaves, 2);
    assert_eq!(tally.errored, 2);
    assert!(!tally.is_success(false));
    assert_eq!(out.lines().count(), 5);
    assert!(out.contains("[ERROR] x.test error: failed to spawn"));
    assert!(out.contains("[ERROR] y.test error: failed to spawn"));
}

/// Test that the reserved name aborts before anything runs
#[test]
fn test_reserved_name_aborts() {
    let (_dir, root) = make_resources();
    fs::write(root.join("a/__LEAF__"), "").unwrap();

    let mut buf = Vec::new();
    let err = run_tests(&settings(&root, "true"), &mut buf, &PlainStyle, false).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TreeError>(),
        Some(TreeError::ReservedName { .. })
    ));
    assert!(buf.is_empty());
}

/// Test the filter and list mode
#[test]
fn test_list_with_filter() {
    let (_dir, root) = make_resources();
    let mut settings = settings(&root, "./never-run");
    settings.filter = Some(Regex::new("^a/b/").unwrap());

    let mut buf = Vec::new();
    let tally = list_tests(&settings, &mut buf, &PlainStyle).unwrap();

    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out, "resources\n  \u{2514} a\n    \u{2514} b\n      \u{2514} y.test\n");
    assert_eq!(tally.leaves, 1);
    assert_eq!(tally.errored, 0);
}

/// Test that build steps produce the executable and clean it up afterwards
#[cfg(unix)]
#[test]
fn test_build_steps_install_and_cleanup() {
    let (dir, root) = make_resources();
    let artifact = dir.path().join("a.out");
    let installed = dir.path().join("prog.out");
    let script = format!(
        "printf '#!/bin/sh\\ncat \"$1\"\\n' > '{}' && chmod +x '{}'",
        artifact.display(),
        artifact.display()
    );

    let mut settings = settings(&root, installed.to_str().unwrap());
    settings.build = vec![BuildStep {
        command: vec!["sh".to_string(), "-c".to_string(), script],
        artifact: Some(artifact.clone()),
        install_as: Some(installed.clone()),
    }];
    settings.reference = Some(ProgramCommand::new("cat"));

    let (out, tally) = run(&settings);

    assert_eq!(tally.passed, 2, "output was:\n{}", out);
    assert!(!artifact.exists());
    assert!(!installed.exists());
}

/// Test that a verdict survives when only the timed executable is missing
#[cfg(unix)]
#[test]
fn test_verdict_printed_when_timing_fails() {
    let (_dir, root) = make_resources();
    let mut settings = settings(&root, "cat");
    settings.reference = Some(ProgramCommand::new("cat"));
    settings.timed = ProgramCommand::new("./no-such-dry-run-e41c");

    let (out, tally) = run(&settings);

    assert_eq!(tally.passed, 2);
    assert_eq!(tally.errored, 2);
    assert!(!tally.is_success(false));
    assert!(out.contains("[PASS] [ERROR] x.test error: failed to spawn"), "output was:\n{}", out);
    assert!(out.contains("[PASS] [ERROR] y.test error: failed to spawn"));
}
