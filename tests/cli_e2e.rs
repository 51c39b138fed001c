//! End-to-end tests for the binary's CLI surface.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn archiver() -> Command {
    Command::cargo_bin("bing-image-archiver").unwrap()
}

#[test]
fn test_help_describes_the_flags() {
    archiver()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--retry-failed"));
}

#[test]
fn test_missing_config_file_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    archiver()
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_invalid_config_file_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    archiver()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    archiver()
        .arg("--definitely-not-a-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}
