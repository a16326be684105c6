// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests for the `stunt` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// `stunt` with a private config directory so tests never read user prefs.
fn stunt(config: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stunt").unwrap();
    cmd.env_remove("RUST_LOG").arg("--config-dir").arg(config.path());
    cmd
}

fn continuity_file(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("continuity.txt");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn check_prints_canonical_procedures() {
    let dir = TempDir::new().unwrap();
    let file = continuity_file(&dir, "mt 4 e\n  fm 5 n");
    stunt(&dir)
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("MT ").and(predicate::str::contains("FM ")))
        .stdout(predicate::str::contains("ok: 2 procedure(s)"));
}

#[test]
fn check_reports_compile_errors_with_position() {
    let dir = TempDir::new().unwrap();
    let file = continuity_file(&dir, "MT 4 E\n  FM 1.2.3 N");
    stunt(&dir)
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("at line 2, column 6"));
}

#[test]
fn check_enforces_beat_budget_only_when_asked() {
    let dir = TempDir::new().unwrap();
    let file = continuity_file(&dir, "MT 4 E FM 5 N");
    stunt(&dir).arg("check").arg(&file).assert().success();
    stunt(&dir)
        .args(["check", "--beats", "8"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1, column 8"));
}

#[test]
fn check_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("check")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading"));
}

#[test]
fn animate_summarizes_a_clean_show() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("animate")
        .arg(fixture("show.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 sheet(s), 2 marcher(s), 8 beat(s)"))
        .stdout(predicate::str::contains("opener"))
        .stdout(predicate::str::contains("errors: none"))
        .stdout(predicate::str::contains("collisions: none"));
}

#[test]
fn animate_prints_one_frame() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("animate")
        .arg(fixture("show.json"))
        .args(["--beat", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beat 5 (sheet 1, beat 1)"))
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("4.00"));
}

#[test]
fn animate_rejects_beats_past_the_end() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("animate")
        .arg(fixture("show.json"))
        .args(["--beat", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("past the end"));
}

#[test]
fn animate_reports_collisions() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("animate")
        .arg(fixture("swap.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("collisions at beats:"));
}

#[test]
fn animate_rejects_malformed_shows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"sheets": [{"name": "1", "beats": 4, "points": "#).unwrap();
    stunt(&dir)
        .arg("animate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing show"));
}

#[test]
fn solve_prints_the_result_as_json() {
    let dir = TempDir::new().unwrap();
    let output = stunt(&dir)
        .arg("solve")
        .arg(fixture("show.json"))
        .args(["--from", "0", "--to", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["total_beats"], 4);
    assert_eq!(result["final_positions"][1]["y"], 64);
}

#[test]
fn solve_uses_requested_instructions_and_algorithm() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("solve")
        .arg(fixture("show.json"))
        .args(["--from", "0", "--to", "1"])
        .args(["--algorithm", "sover_eliceiri_hershkovitz"])
        .args(["--instruction", "nsew:2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_beats\": 6"))
        .stdout(predicate::str::contains("MT 2 E"));
}

#[test]
fn solve_rejects_bad_arguments() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .arg("solve")
        .arg(fixture("show.json"))
        .args(["--from", "0", "--to", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sheet 7"));
    stunt(&dir)
        .arg("solve")
        .arg(fixture("show.json"))
        .args(["--from", "0", "--to", "1", "--instruction", "FMTO:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown movement pattern"));
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    stunt(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("wrote"));
    assert!(dir.path().join("prefs.json").exists());
    stunt(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
    stunt(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_beats\": 48"));
}

#[test]
fn saved_prefs_limit_the_solver() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("prefs.json"),
        r#"{"solver": {"max_beats": 2}}"#,
    )
    .unwrap();
    stunt(&dir)
        .arg("solve")
        .arg(fixture("show.json"))
        .args(["--from", "0", "--to", "1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"));
}
