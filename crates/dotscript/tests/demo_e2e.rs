//! End-to-end tests for a script program built with `#[script_main]`.
//!
//! These run the `dotscript-demo` binary in a scratch working directory and
//! check its exit status, stderr and the artifact it leaves behind.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin for tests

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Scratch working directory for one demo run.
struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn artifact(&self) -> PathBuf {
        self.path().join("jenkinsExecution.json")
    }

    fn demo(&self) -> Command {
        let mut cmd = Command::cargo_bin("dotscript-demo").expect("demo binary should build");
        cmd.current_dir(self.path())
            .env_remove("DOTSCRIPT_DEPLOYMENT")
            .env_remove("DOTSCRIPT_ARTIFACT")
            .env_remove("DEMO_LABEL")
            .env_remove("RUST_LOG");
        cmd
    }

    fn saved(&self, path: &Path) -> serde_json::Value {
        let contents = fs::read_to_string(path).expect("artifact should exist");
        let json: serde_json::Value =
            serde_json::from_str(&contents).expect("artifact should be valid JSON");
        json["SavedEnvironment"].clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_exit_code_is_script_return_value() {
    let ws = Workspace::new();

    ws.demo().args(["a", "b", "c"]).assert().code(3);

    assert_eq!(ws.saved(&ws.artifact()), serde_json::json!({ "ARG_COUNT": "3" }));
}

#[test]
fn test_no_arguments_exits_zero() {
    let ws = Workspace::new();

    ws.demo().assert().success();

    assert_eq!(ws.saved(&ws.artifact()), serde_json::json!({ "ARG_COUNT": "0" }));
}

#[test]
fn test_environment_is_visible_to_script() {
    let ws = Workspace::new();

    ws.demo().env("DEMO_LABEL", "nightly").assert().success();

    assert_eq!(ws.saved(&ws.artifact())["LABEL"], "nightly");
}

#[test]
fn test_script_error_fails_run_and_keeps_state() {
    let ws = Workspace::new();

    ws.demo()
        .arg("--fail")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("an error happened executing the script"))
        .stderr(predicate::str::contains("requested failure"));

    assert_eq!(ws.saved(&ws.artifact())["ARG_COUNT"], "1");
}

#[test]
fn test_script_panic_fails_run_and_keeps_state() {
    let ws = Workspace::new();

    ws.demo()
        .arg("--panic")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("script panicked"));

    assert_eq!(ws.saved(&ws.artifact())["ARG_COUNT"], "1");
}

#[test]
fn test_other_deployment_finds_no_entry_point() {
    let ws = Workspace::new();

    ws.demo()
        .env("DOTSCRIPT_DEPLOYMENT", "script")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot find any main method named `ScriptMain`"));

    assert_eq!(ws.saved(&ws.artifact()), serde_json::json!({}));
}

#[test]
fn test_invalid_deployment_is_rejected() {
    let ws = Workspace::new();

    ws.demo()
        .env("DOTSCRIPT_DEPLOYMENT", "powershell")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));

    assert!(!ws.artifact().exists());
}

#[test]
fn test_artifact_path_override() {
    let ws = Workspace::new();
    let custom = ws.path().join("out").join("session.json");

    ws.demo()
        .env("DOTSCRIPT_ARTIFACT", &custom)
        .args(["x", "y"])
        .assert()
        .code(2);

    assert!(!ws.artifact().exists());
    assert_eq!(ws.saved(&custom), serde_json::json!({ "ARG_COUNT": "2" }));
}
