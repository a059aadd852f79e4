// src/exec/launcher.rs

//! Pluggable process launcher.
//!
//! A `Handle` never touches `tokio::process` directly; it asks a
//! [`ProcessLauncher`] to start its entry point and keeps the two channels of
//! the returned [`LaunchedProcess`]:
//!
//! - `exit` resolves once with the [`ExitOutcome`] of the process;
//! - `kill` forwards a termination request to whoever owns the child.
//!
//! `RealProcessLauncher` spawns OS processes. Tests provide their own
//! launcher that completes "processes" on a script.

use tokio::sync::oneshot;
use tracing::info;

use crate::errors::{HerdsmanError, Result};
use crate::exec::ExitOutcome;
use crate::exec::process_runner::run_process;
use crate::workload::EntryPoint;

/// Trait abstracting how a workload's process is created.
pub trait ProcessLauncher: Send + Sync {
    /// Start the process for `entry`.
    ///
    /// Must be called from within a Tokio runtime. An `Err` means the process
    /// could not be created at all.
    fn launch(&self, workload: &str, entry: &EntryPoint) -> Result<LaunchedProcess>;
}

/// The supervisor-side end of a started process.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub pid: Option<u32>,
    pub exit: oneshot::Receiver<ExitOutcome>,
    pub kill: oneshot::Sender<()>,
}

/// The runner-side end of a started process.
#[derive(Debug)]
pub struct ProcessControl {
    pub exit: oneshot::Sender<ExitOutcome>,
    pub kill: oneshot::Receiver<()>,
}

impl LaunchedProcess {
    /// Create a connected pair of process ends.
    pub fn pair(pid: Option<u32>) -> (LaunchedProcess, ProcessControl) {
        let (exit_tx, exit_rx) = oneshot::channel();
        let (kill_tx, kill_rx) = oneshot::channel();
        (
            LaunchedProcess {
                pid,
                exit: exit_rx,
                kill: kill_tx,
            },
            ProcessControl {
                exit: exit_tx,
                kill: kill_rx,
            },
        )
    }
}

/// Launcher used in production: one OS process per workload.
#[derive(Debug, Clone, Default)]
pub struct RealProcessLauncher;

impl ProcessLauncher for RealProcessLauncher {
    fn launch(&self, workload: &str, entry: &EntryPoint) -> Result<LaunchedProcess> {
        let mut cmd = entry.command();
        let child = cmd.spawn().map_err(|e| HerdsmanError::Spawn {
            workload: workload.to_string(),
            reason: format!("{}: {e}", entry.program),
        })?;

        let (launched, control) = LaunchedProcess::pair(child.id());
        info!(
            workload = %workload,
            pid = ?launched.pid,
            cmd = %entry.display_command(),
            "workload process spawned"
        );

        tokio::spawn(run_process(workload.to_string(), child, control));
        Ok(launched)
    }
}
