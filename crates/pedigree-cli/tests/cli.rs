//! End-to-end tests of the `pedigree` binary with a zero-latency source.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn pedigree(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pedigree").unwrap();
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "info")
        .env_remove("PEDIGREE_SOURCE__LATENCY_MS")
        .arg("--latency-ms")
        .arg("0");
    cmd
}

#[test]
fn single_depth_first_run() {
    let dir = tempfile::tempdir().unwrap();
    pedigree(&dir)
        .args(["--part", "1", "--generations", "3", "--seed", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Depth First Search finished"))
        .stdout(predicate::str::contains("max_concurrent_calls"));
}

#[test]
fn runs_file_drives_every_part() {
    let dir = tempfile::tempdir().unwrap();
    let runs = dir.path().join("runs.txt");
    fs::write(&runs, "1,3\n2,3\nnot a run\n3,2\n").unwrap();

    pedigree(&dir)
        .arg("--runs")
        .arg(&runs)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping invalid run"))
        .stdout(predicate::str::contains("Depth First Search finished"))
        .stdout(predicate::str::contains("Breadth First Search (20 workers)"))
        .stdout(predicate::str::contains("Breadth First Search (5 workers)"));
}

#[test]
fn config_file_sets_worker_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[traversal]\nbfs_workers = 7\n").unwrap();

    pedigree(&dir)
        .arg("--config")
        .arg(&config)
        .args(["--part", "2", "--generations", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Breadth First Search (7 workers)"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[traversal]\nbfs_workers = 0\n").unwrap();

    pedigree(&dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bfs_workers must be at least 1"));
}

#[test]
fn part_out_of_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    pedigree(&dir).args(["--part", "4"]).assert().failure();
}

#[test]
fn empty_runs_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let runs = dir.path().join("runs.txt");
    fs::write(&runs, "\n# nothing\n").unwrap();

    pedigree(&dir)
        .arg("--runs")
        .arg(&runs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid runs"));
}
