//! End-to-end tests for Ripple CLI commands.
//!
//! These tests run the `ripple` binary against the built-in demo notebook.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin for tests

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn ripple() -> Command {
    Command::cargo_bin("ripple").expect("Failed to find ripple binary")
}

/// A config file in a temporary directory.
struct TestConfig {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestConfig {
    fn new(contents: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("kernel.json");
        fs::write(&path, contents).expect("Failed to write config");
        Self {
            _temp_dir: temp_dir,
            path,
        }
    }

    fn path(&self) -> &str {
        self.path.to_str().unwrap()
    }
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = ripple()
        .arg("run")
        .arg("--json")
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// =============================================================================
// ripple run Tests
// =============================================================================

#[test]
fn test_run_default_notebook() {
    ripple()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running"))
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("Completed"));
}

#[test]
fn test_run_json_context() {
    let context = run_json(&[]);
    assert_eq!(context["limit"], 1);
    assert_eq!(context["x"].as_array().unwrap().len(), 100);
    assert_eq!(context["x_slice"], serde_json::json!([1]));
    assert_eq!(context["y_slice"], serde_json::json!([2]));
}

#[test]
fn test_run_with_assignments() {
    let context = run_json(&["--set", "limit=42"]);
    assert_eq!(context["limit"], 42);
    assert_eq!(context["x_slice"].as_array().unwrap().len(), 42);
    assert_eq!(context["y_slice"][41], 84);

    let summary = context["summary"].as_str().unwrap();
    assert!(summary.contains("Showing **42** data points"));
    assert!(summary.contains("Last value: **42** → 84"));
}

#[test]
fn test_run_assignments_apply_in_order() {
    let context = run_json(&["--set", "limit=80", "--set", "limit=3"]);
    assert_eq!(context["x_slice"], serde_json::json!([1, 2, 3]));
}

#[test]
fn test_run_is_deterministic() {
    let args = ["--set", "limit=7", "--set", "limit=64"];
    assert_eq!(run_json(&args), run_json(&args));
}

#[test]
fn test_run_failing_cell() {
    ripple()
        .args(["run", "--set", "limit=500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 100"));
}

#[test]
fn test_run_undefined_name() {
    ripple()
        .args(["run", "--set", "bogus=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined name `bogus`"));
}

#[test]
fn test_run_malformed_assignment() {
    ripple()
        .args(["run", "--set", "limit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected name=value"));
}

#[test]
fn test_run_with_config_file() {
    let config = TestConfig::new(r#"{ "validation": "fail_fast", "catch_panics": true }"#);
    ripple()
        .args(["run", "--config", config.path()])
        .assert()
        .success();
}

#[test]
fn test_run_with_invalid_config_file() {
    let config = TestConfig::new(r#"{ "parallel": true }"#);
    ripple()
        .args(["run", "--config", config.path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

// =============================================================================
// ripple graph Tests
// =============================================================================

#[test]
fn test_graph_levels() {
    ripple()
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 cells, 4 edges"))
        .stdout(predicate::str::contains("Level 2"))
        .stdout(predicate::str::contains(
            "Order: data → limit → slice → summary",
        ));
}

#[test]
fn test_graph_single_cell() {
    ripple()
        .args(["graph", "--cell", "slice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upstream:   data → limit"))
        .stdout(predicate::str::contains("downstream: summary"));
}

#[test]
fn test_graph_unknown_cell() {
    ripple()
        .args(["graph", "--cell", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cell named `nope`"));
}
