//! Integration tests for the `regions` subcommands.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("boxtract").unwrap()
}

#[test]
fn add_then_list_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("regions.json");

    cmd()
        .args(["regions", "add"])
        .arg(&file)
        .args(["Title", "50", "650", "550", "750"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved region 'Title'"));

    cmd()
        .args(["regions", "list"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: [50, 650, 550, 750]"));
}

#[test]
fn add_normalizes_corner_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("regions.json");

    cmd()
        .args(["regions", "add"])
        .arg(&file)
        .args(["Box", "550", "750", "50", "650"])
        .assert()
        .success();

    let json = std::fs::read_to_string(&file).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        parsed["Box"],
        serde_json::json!([50.0, 650.0, 550.0, 750.0])
    );
}

#[test]
fn add_same_name_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("regions.json");

    cmd()
        .args(["regions", "add"])
        .arg(&file)
        .args(["Field", "0", "0", "1", "1"])
        .assert()
        .success();
    cmd()
        .args(["regions", "add"])
        .arg(&file)
        .args(["Field", "2", "2", "3", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 total)"));
}

#[test]
fn remove_unknown_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("regions.json");

    cmd()
        .args(["regions", "add"])
        .arg(&file)
        .args(["Keep", "0", "0", "1", "1"])
        .assert()
        .success();

    cmd()
        .args(["regions", "remove"])
        .arg(&file)
        .arg("Gone")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no region named 'Gone'"));
}

#[test]
fn list_empty_file_reports_no_regions() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("regions.json");

    cmd()
        .args(["regions", "list"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No regions defined"));
}
