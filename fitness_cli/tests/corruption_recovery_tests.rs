//! Corruption recovery tests for fittrack.
//!
//! These tests verify the CLI handles:
//! - Malformed or invalid config files
//! - A database file that is not SQLite
//! - A stale lock file left by a dead process
//! - A missing data directory

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fittrack"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_malformed_config_file() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[calories\ndefault_gender = ").unwrap();

    cli(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["workout", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}

#[test]
fn test_invalid_config_values() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[progress]\nincrement = -0.5\n").unwrap();

    cli(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["workout", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_config_from_default_location() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/fittrack");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[calories]\ndefault_gender = \"MALE\"\ndefault_activity = \"active\"\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .args(["calories", "calc", "--age", "25", "--height", "170", "--weight", "65"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2746.07 kcal/day"));
}

#[test]
fn test_database_file_not_sqlite() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("fitness.db"), "not a database ".repeat(64)).unwrap();

    cli(temp_dir.path())
        .args(["workout", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage fault"))
        .stderr(predicate::str::contains("previously saved data is unchanged"));

    // The file is left for the user to inspect
    let contents = fs::read_to_string(data_dir.join("fitness.db")).unwrap();
    assert!(contents.starts_with("not a database"));
}

#[test]
fn test_stale_lock_file_is_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("fitness.db.lock"), "").unwrap();

    cli(temp_dir.path())
        .args(["workout", "add", "--name", "Plank"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["workout", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plank"));
}

#[test]
fn test_missing_data_dir_is_created() {
    let temp_dir = setup_test_dir();
    let nested = temp_dir.path().join("deeply/nested");

    Command::new(assert_cmd::cargo::cargo_bin!("fittrack"))
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--data-dir")
        .arg(&nested)
        .args(["schedule", "mark", "2025-01-01"])
        .assert()
        .success();

    assert!(nested.join("fitness.db").exists());
}
