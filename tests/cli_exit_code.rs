// tests/cli_exit_code.rs

//! Runs the compiled `herdsman` binary.

#![cfg(unix)]

use std::process::Command;

use herdsman_test_utils::builders::WorkloadDirBuilder;

fn herdsman() -> Command {
    Command::new(env!("CARGO_BIN_EXE_herdsman"))
}

#[test]
fn empty_workload_directory_exits_non_zero() {
    let tree = WorkloadDirBuilder::new().with_file("__init__.py", "").build();

    let output = herdsman()
        .current_dir(tree.root())
        .args(["--quiet", "--liveness-interval", "1s"])
        .output()
        .expect("failed to run herdsman");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No workloads discovered"), "stderr: {stderr}");
}

#[test]
fn completed_run_exits_zero_even_with_failed_workloads() {
    let tree = WorkloadDirBuilder::at("jobs")
        .with_sh("ok", "echo hello from ok")
        .with_sh("bad", "exit 4")
        .build();
    let status_file = tree.root().join("status.json");
    let log_dir = tree.root().join("var/logs");

    let output = herdsman()
        .current_dir(tree.root())
        .arg("-d")
        .arg("jobs")
        .arg("-l")
        .arg(&log_dir)
        .arg("--status-file")
        .arg(&status_file)
        .output()
        .expect("failed to run herdsman");

    assert_eq!(output.status.code(), Some(0), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Starting main process"));
    assert!(stdout.contains("Main process completed"));

    let log = std::fs::read_to_string(log_dir.join("herdsman.log")).expect("log file");
    assert!(log.contains("hello from ok"));
    assert!(log.contains("exited with code 4"));

    let status: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&status_file).expect("status file"))
            .expect("valid json");
    assert_eq!(status.as_array().map(|a| a.len()), Some(2));
}

#[test]
fn dry_run_lists_workloads_without_running_them() {
    let tree = WorkloadDirBuilder::new()
        .with_sh("marker", "touch ran.txt")
        .build();

    let output = herdsman()
        .current_dir(tree.root())
        .args(["--dry-run", "--quiet"])
        .output()
        .expect("failed to run herdsman");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("workloads (1):"));
    assert!(stdout.contains("- marker"));
    assert!(!tree.root().join("ran.txt").exists());
}

#[test]
fn dry_run_with_no_workloads_exits_non_zero() {
    let tree = WorkloadDirBuilder::new().with_file("__init__.py", "").build();

    let output = herdsman()
        .current_dir(tree.root())
        .args(["--dry-run", "--quiet"])
        .output()
        .expect("failed to run herdsman");

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("workloads (0):"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No workloads discovered"), "stderr: {stderr}");
}

#[test]
fn invalid_cli_interval_is_a_fatal_config_error() {
    let tree = WorkloadDirBuilder::new().with_sh("a", "true").build();

    let output = herdsman()
        .current_dir(tree.root())
        .args(["--liveness-interval", "often"])
        .output()
        .expect("failed to run herdsman");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("liveness_interval"), "stderr: {stderr}");
}
