// tests/real_processes.rs

//! End-to-end runs against real `sh` processes in temporary directories.

#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use herdsman::discovery::{ScriptLoader, discover};
use herdsman::exec::RealProcessLauncher;
use herdsman::fs::RealFileSystem;
use herdsman::report;
use herdsman::supervisor::Supervisor;
use herdsman::types::WorkloadStatus;
use herdsman_test_utils::builders::WorkloadDirBuilder;
use herdsman_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn immediate_success_completes_with_wall_clock_duration() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new().with_sh("quick", "echo done").build();
    let cfg = tree.config().build();

    let wall = Instant::now();
    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;
    let wall = wall.elapsed();

    let quick = summary.handle("quick").expect("quick handle");
    assert_eq!(quick.status(), WorkloadStatus::Completed);
    assert!(quick.failure().is_none());
    assert!(quick.pid().is_some());

    let (start, end) = (quick.start_time().unwrap(), quick.end_time().unwrap());
    assert!(end >= start);
    assert_eq!((end - start).to_std()?, quick.run_duration());
    assert!(quick.run_duration() <= wall);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_failed_and_siblings_complete() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new()
        .with_sh("good", "echo fine")
        .with_sh("bad", "echo going down >&2; exit 3")
        .with_sh("other", "sleep 0.1")
        .with_file("__init__.py", "")
        .build();
    let cfg = tree.config().build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    assert_eq!(summary.handles.len(), 3);
    let bad = summary.handle("bad").unwrap();
    assert_eq!(bad.status(), WorkloadStatus::Failed);
    assert_eq!(bad.failure(), Some("exited with code 3"));
    assert_eq!(summary.handle("good").unwrap().status(), WorkloadStatus::Completed);
    assert_eq!(summary.handle("other").unwrap().status(), WorkloadStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn workload_directory_is_found_below_the_root() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::at("services/batch/sub_processes")
        .with_sh("nested", "true")
        .build();
    let cfg = tree.config().build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    assert_eq!(summary.count(WorkloadStatus::Completed), 1);
    assert_eq!(summary.handles[0].name(), "nested");
    Ok(())
}

#[tokio::test]
async fn custom_entry_symbol_is_invoked() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new()
        .with_sh_function("custom", "start", "exit 0")
        .with_sh("ignored_main_only", "exit 1")
        .build();
    let cfg = tree.config().entry_symbol("start").build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    let names: Vec<&str> = summary.handles.iter().map(|h| h.name()).collect();
    assert_eq!(names, vec!["custom"]);
    assert!(summary.all_completed());
    Ok(())
}

#[tokio::test]
async fn long_running_workload_is_reported_as_alive() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new().with_sh("sleepy", "sleep 0.4").build();
    let cfg = tree.config().liveness_interval("100ms").build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    assert!(summary.report.liveness_observations >= 1);
    assert!(summary.handle("sleepy").unwrap().run_duration() >= Duration::from_millis(300));
    Ok(())
}

#[tokio::test]
async fn status_file_reflects_the_finished_run() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new()
        .with_sh("ok", "true")
        .with_sh("broken", "exit 2")
        .build();
    let cfg = tree.config().build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    let path = tree.root().join("out/status.json");
    report::write_status_file(&path, &summary.records())?;

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let entries = written.as_array().expect("array of records");
    assert_eq!(entries.len(), 2);

    let broken = entries
        .iter()
        .find(|e| e["name"] == "broken")
        .expect("broken record");
    assert_eq!(broken["status"], "Failed");
    assert_eq!(broken["failure"], "exited with code 2");
    assert!(broken["start_time"]["timestamp"].as_f64().is_some());
    assert!(broken["run_duration"]["human_readable"].as_str().unwrap().starts_with("0:00:"));
    Ok(())
}

#[tokio::test]
async fn raising_python_entry_point_fails_and_sibling_completes() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new()
        .with_file(
            "boom.py",
            "def main():\n    raise RuntimeError(\"workload exploded\")\n",
        )
        .with_file("fine.py", "def main():\n    print(\"all good\")\n")
        .build();
    let cfg = tree.config().build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    let boom = summary.handle("boom").expect("boom handle");
    assert_eq!(boom.entry().runtime, "py");
    assert_eq!(boom.status(), WorkloadStatus::Failed);
    assert_eq!(boom.failure(), Some("exited with code 1"));
    assert_eq!(summary.handle("fine").unwrap().status(), WorkloadStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn kill_terminates_a_real_process() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new()
        .with_sh("sleeper", "exec sleep 30")
        .with_sh("quick", "true")
        .build();
    let cfg = tree.config().build();
    let references = discover(
        &RealFileSystem,
        &herdsman::discovery_request(&cfg)?,
        &ScriptLoader::default(),
    );

    let mut supervisor = Supervisor::new(Arc::new(RealProcessLauncher));
    supervisor.create_all(references)?;
    supervisor.start_all()?;
    supervisor.kill("sleeper")?;

    let started = Instant::now();
    with_timeout(supervisor.monitor()).await?;

    let sleeper = supervisor.handle("sleeper").expect("sleeper handle");
    assert_eq!(sleeper.status(), WorkloadStatus::Killed);
    assert_eq!(sleeper.failure(), Some("killed on request"));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(supervisor.handle("quick").unwrap().status(), WorkloadStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn crash_signal_fails_and_termination_signal_kills() -> TestResult {
    init_tracing();

    let tree = WorkloadDirBuilder::new()
        .with_sh("crashes", "kill -SEGV $$")
        .with_sh("terminated", "kill -TERM $$")
        .build();
    let cfg = tree.config().build();

    let summary = with_timeout(herdsman::supervise(
        &RealFileSystem,
        &cfg,
        Arc::new(RealProcessLauncher),
    ))
    .await?;

    let crashes = summary.handle("crashes").unwrap();
    assert_eq!(crashes.status(), WorkloadStatus::Failed);
    assert_eq!(crashes.failure(), Some("terminated by signal 11"));
    assert_eq!(summary.handle("terminated").unwrap().status(), WorkloadStatus::Killed);
    Ok(())
}
