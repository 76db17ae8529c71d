//! End-to-end tests for the tensorex CLI, invoking the built binary.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use tensorex_io::{dump_npy, load_npy};
use tensorex_tensor::Tensor;

// =============================================================================
// Test Helpers
// =============================================================================

fn tensorex_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tensorex").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn write_matrix(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("m.npy");
    let t = Tensor::from_vec(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    dump_npy(&path, &t).unwrap();
    path
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    tensorex_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("convert"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    tensorex_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tensorex"));
}

// =============================================================================
// Inspect, Stats and Print
// =============================================================================

#[test]
fn test_inspect_npy() {
    let dir = TempDir::new().unwrap();
    let path = write_matrix(&dir);
    tensorex_cmd(&dir)
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("f64"))
        .stdout(predicate::str::contains("(2, 3)"))
        .stdout(predicate::str::contains("row_major"));
}

#[test]
fn test_inspect_missing_file() {
    let dir = TempDir::new().unwrap();
    tensorex_cmd(&dir)
        .arg("inspect")
        .arg("absent.npy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_stats_along_axis() {
    let dir = TempDir::new().unwrap();
    let path = write_matrix(&dir);
    tensorex_cmd(&dir)
        .arg("stats")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("21"))
        .stdout(predicate::str::contains("3.5"));

    tensorex_cmd(&dir)
        .args(["stats", "m.npy", "--axis", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{ 6., 15.}"));
}

#[test]
fn test_print_with_precision() {
    let dir = TempDir::new().unwrap();
    write_matrix(&dir);
    tensorex_cmd(&dir)
        .args(["print", "m.npy", "--precision", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{{1.0, 2.0, 3.0},\n {4.0, 5.0, 6.0}}"));
}

#[test]
fn test_print_uses_config_file() {
    let dir = TempDir::new().unwrap();
    write_matrix(&dir);
    fs::write(
        dir.path().join("tensorex.toml"),
        "[engine.print]\nprecision = 2\n",
    )
    .unwrap();
    tensorex_cmd(&dir)
        .args(["print", "m.npy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.00"));
}

// =============================================================================
// Convert and Config
// =============================================================================

#[test]
fn test_convert_roundtrip() {
    let dir = TempDir::new().unwrap();
    write_matrix(&dir);

    tensorex_cmd(&dir)
        .args(["convert", "m.npy", "m.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert_eq!(
        fs::read_to_string(dir.path().join("m.csv")).unwrap(),
        "1,2,3\n4,5,6\n"
    );

    tensorex_cmd(&dir)
        .args(["convert", "m.csv", "back.npy", "--dtype", "i32"])
        .assert()
        .success();
    let back: Tensor<i32> = load_npy(dir.path().join("back.npy")).unwrap();
    assert_eq!(back.shape(), &[2, 3]);
    assert_eq!(back.to_vec(), vec![1, 2, 3, 4, 5, 6]);

    tensorex_cmd(&dir)
        .args(["convert", "m.npy", "m.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_convert_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    write_matrix(&dir);
    tensorex_cmd(&dir)
        .args(["convert", "m.npy", "m.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn test_config_prints_toml() {
    let dir = TempDir::new().unwrap();
    tensorex_cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("parallel_threshold = 4096"))
        .stdout(predicate::str::contains("[output]"));

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[engine]\nparallel_threshold = 0\n").unwrap();
    tensorex_cmd(&dir)
        .arg("--config")
        .arg(&bad)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
