//! Integration tests for the `tt` CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tt() -> Command {
    Command::cargo_bin("tt").unwrap()
}

// -- classify --

#[test]
fn classify_branched_d20_extreme() {
    tt().args(["classify", "20b", "10", "19"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extreme (2)"));
}

#[test]
fn classify_d100_boundary() {
    tt().args(["classify", "100", "50", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success (0)"));
    tt().args(["classify", "100", "50", "51"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failure (-1)"));
}

#[test]
fn classify_unknown_key_fails() {
    tt().args(["classify", "d6", "10", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("d6"));
}

// -- roll --

#[test]
fn roll_single_faced_die_sums_count() {
    tt().args(["roll", "3", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total 3"));
}

#[test]
fn roll_zero_dice_passes_through_size() {
    tt().args(["roll", "0", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total 20"));
}

#[test]
fn roll_with_seed_is_reproducible() {
    let first = tt()
        .args(["roll", "5", "6", "--seed", "42"])
        .output()
        .unwrap();
    let second = tt()
        .args(["roll", "5", "6", "--seed", "42"])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn roll_classifies_with_key_and_reference() {
    // Against 20 every d20 roll succeeds on the plain table.
    tt().args(["roll", "4", "20", "--ref", "20", "--key", "20", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success (0)"))
        .stdout(predicate::str::contains("Failure").not());
}

#[test]
fn roll_negative_count_fails() {
    tt().args(["roll", "--", "-2", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn roll_too_many_dice_fails() {
    tt().args(["roll", "1000", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn roll_unknown_key_fails() {
    tt().args(["roll", "1", "20", "--ref", "10", "--key", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("30"));
}

// -- serve --

#[test]
fn serve_rejects_invalid_env() {
    tt().args(["serve"])
        .env("TT_PORT", "eighty")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TT_PORT"));
}

#[test]
fn serve_reads_dotenv_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "TT_MAX_DICE=lots\n").unwrap();

    tt().args(["serve"])
        .current_dir(dir.path())
        .env_remove("TT_MAX_DICE")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TT_MAX_DICE"));
}
