// src/workload.rs

//! Typed descriptors produced by discovery and consumed by the supervisor.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

/// Canonical workload name type.
pub type WorkloadName = String;

/// A resolved entry point: everything needed to launch one workload.
///
/// Built once by an [`EntryLoader`](crate::discovery::EntryLoader); launching
/// never looks anything up by string again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Source file of the workload.
    pub path: PathBuf,
    /// Entry symbol invoked inside the file (e.g. `main`).
    pub symbol: String,
    /// Runtime key the file was resolved with (its extension, e.g. `sh`).
    pub runtime: String,
    /// Program to execute.
    pub program: String,
    /// Arguments with `{path}` / `{symbol}` already substituted.
    pub args: Vec<String>,
}

impl EntryPoint {
    /// Build the command that runs this entry point.
    ///
    /// Output is piped so the launcher can forward it to the log, and the
    /// child is killed if its owner goes away.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Human readable form used in logs and `--dry-run`.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|a| {
            if a.contains(char::is_whitespace) {
                format!("'{a}'")
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Immutable descriptor for one discovered workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadReference {
    pub name: WorkloadName,
    pub entry: EntryPoint,
}

impl WorkloadReference {
    pub fn new(name: impl Into<WorkloadName>, entry: EntryPoint) -> Self {
        Self {
            name: name.into(),
            entry,
        }
    }

    pub fn path(&self) -> &Path {
        &self.entry.path
    }
}
