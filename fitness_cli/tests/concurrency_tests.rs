//! Concurrency tests for fittrack.
//!
//! These tests verify that:
//! - Only one process holds the record store at a time
//! - Processes that retry after a lock rejection all land their writes
//! - Sequential runs see each other's data

use assert_cmd::Command;
use fitness_core::{Error, RecordStore};
use std::path::Path;
use std::thread;
use std::time::Duration;
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
fn test_sequential_runs_accumulate() {
    let temp_dir = setup_test_dir();

    for i in 0..5 {
        cli(temp_dir.path())
            .args(["workout", "add", "--name"])
            .arg(format!("Session {}", i))
            .assert()
            .success();
    }

    let store = RecordStore::open(&temp_dir.path().join("data/fitness.db")).unwrap();
    assert_eq!(store.workouts().unwrap().len(), 5);
}

#[test]
fn test_held_store_rejects_second_process() {
    let temp_dir = setup_test_dir();
    let db_path = temp_dir.path().join("data/fitness.db");

    let store = RecordStore::open(&db_path).unwrap();

    cli(temp_dir.path())
        .args(["workout", "list"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("already open"));

    drop(store);

    cli(temp_dir.path())
        .args(["workout", "list"])
        .assert()
        .success();
}

#[test]
fn test_second_open_in_same_process_rejected() {
    let temp_dir = setup_test_dir();
    let db_path = temp_dir.path().join("data/fitness.db");

    // Create the database, then hold it from this process
    drop(RecordStore::open(&db_path).unwrap());
    let held = RecordStore::open(&db_path).unwrap();
    assert!(matches!(
        RecordStore::open(&db_path),
        Err(Error::StoreLocked(_))
    ));
    drop(held);

    assert!(RecordStore::open(&db_path).is_ok());
}

#[test]
fn test_concurrent_writers_with_retry() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dir = dir.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let output = cli(&dir)
                        .args(["schedule", "mark"])
                        .arg(format!("2025-06-{:02}", i + 1))
                        .output()
                        .unwrap();
                    if output.status.success() {
                        return true;
                    }
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    assert!(stderr.contains("already open"), "unexpected failure: {}", stderr);
                    thread::sleep(Duration::from_millis(10));
                }
                false
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap(), "writer never acquired the store");
    }

    cli(&dir)
        .args(["schedule", "show", "--month", "2025-06"])
        .assert()
        .success()
        .stdout(predicates::str::contains("4 marked day(s)"));
}
