// src/exec/outcome.rs

use std::process::ExitStatus;

use crate::types::WorkloadStatus;

/// Signals that mean "someone stopped this process": SIGHUP, SIGINT,
/// SIGKILL, SIGTERM. Any other signal is the process crashing.
const TERMINATION_SIGNALS: [i32; 4] = [1, 2, 9, 15];

/// How a workload process ended, as observed by its runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The process exited on its own with this code.
    Exited(i32),
    /// The process was terminated by a signal.
    Signalled(i32),
    /// The process was terminated on request through its handle.
    Killed,
    /// Waiting on the process failed, or its runner vanished.
    WaitError(String),
}

impl ExitOutcome {
    pub fn from_exit_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signalled(signal);
            }
        }

        ExitOutcome::WaitError(format!("process ended without exit code ({status})"))
    }

    /// Terminal status this outcome moves a handle into.
    pub fn status(&self) -> WorkloadStatus {
        match self {
            ExitOutcome::Exited(0) => WorkloadStatus::Completed,
            ExitOutcome::Exited(_) | ExitOutcome::WaitError(_) => WorkloadStatus::Failed,
            ExitOutcome::Signalled(signal) if TERMINATION_SIGNALS.contains(signal) => {
                WorkloadStatus::Killed
            }
            ExitOutcome::Signalled(_) => WorkloadStatus::Failed,
            ExitOutcome::Killed => WorkloadStatus::Killed,
        }
    }

    /// Cause recorded on the handle, if the outcome was not a success.
    pub fn cause(&self) -> Option<String> {
        match self {
            ExitOutcome::Exited(0) => None,
            ExitOutcome::Exited(code) => Some(format!("exited with code {code}")),
            ExitOutcome::Signalled(signal) => Some(format!("terminated by signal {signal}")),
            ExitOutcome::Killed => Some("killed on request".to_string()),
            ExitOutcome::WaitError(reason) => Some(reason.clone()),
        }
    }
}
