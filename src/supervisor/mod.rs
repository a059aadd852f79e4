// src/supervisor/mod.rs

//! Supervision of one run.
//!
//! The [`Supervisor`] owns the registry of [`Handle`]s for a run and drives
//! them in three phases:
//!
//! 1. `create_all`: one handle per discovered reference, in discovery order;
//! 2. `start_all`: every handle is started before anything is awaited;
//! 3. `monitor`: completions are drained as they happen (see [`monitor`]).
//!
//! A workload failing never stops the others from being observed. The only
//! run-aborting condition is having nothing to run.
//!
//! All workloads are started at once; there is no concurrency ceiling.

pub mod monitor;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{Instrument, Span, error, info, info_span};

use crate::errors::{HerdsmanError, Result};
use crate::exec::ProcessLauncher;
use crate::handle::Handle;
use crate::report::{self, StatusRecord};
use crate::types::WorkloadStatus;
use crate::workload::WorkloadReference;

pub use monitor::{
    DEFAULT_LIVENESS_INTERVAL, MAX_LIVENESS_INTERVAL, MonitorOptions, MonitorReport,
};

pub struct Supervisor {
    handles: Vec<Handle>,
    launcher: Arc<dyn ProcessLauncher>,
    options: MonitorOptions,
    span: Span,
    created: bool,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("handles", &self.handles)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            handles: Vec::new(),
            launcher,
            options: MonitorOptions::default(),
            span: info_span!("supervisor"),
            created: false,
        }
    }

    pub fn with_options(mut self, options: MonitorOptions) -> Self {
        self.options = options;
        self
    }

    /// Nest all supervisor and workload log lines under `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn handle(&self, name: &str) -> Option<&Handle> {
        self.handles.iter().find(|h| h.name() == name)
    }

    /// Build the registry: one handle per reference, in order.
    pub fn create_all(&mut self, references: Vec<WorkloadReference>) -> Result<()> {
        if self.created {
            return Err(HerdsmanError::InvalidTransition {
                workload: "registry".to_string(),
                from: WorkloadStatus::NotStarted,
                operation: "create an already built registry",
            });
        }
        if references.is_empty() {
            error!(parent: &self.span, "no workloads found");
            return Err(HerdsmanError::NoWorkloads);
        }

        let mut seen = HashSet::new();
        for reference in &references {
            if !seen.insert(reference.name.as_str()) {
                return Err(HerdsmanError::DuplicateWorkload(reference.name.clone()));
            }
        }

        self.handles = references
            .into_iter()
            .map(|r| Handle::with_parent(r, &self.span))
            .collect();
        self.created = true;
        Ok(())
    }

    /// Issue `start` on every handle.
    ///
    /// Spawn failures are recorded on their handle; only an out-of-order
    /// call is returned as an error.
    pub fn start_all(&mut self) -> Result<()> {
        info!(parent: &self.span, count = self.handles.len(), "starting workloads");

        for handle in &mut self.handles {
            handle.start(self.launcher.as_ref())?;
        }

        let failed = self
            .handles
            .iter()
            .filter(|h| h.status() == WorkloadStatus::Failed)
            .count();
        if failed > 0 {
            error!(parent: &self.span, failed, "some workloads could not be spawned");
        }
        Ok(())
    }

    /// Request termination of one running workload.
    pub fn kill(&mut self, name: &str) -> Result<()> {
        let handle = self
            .handles
            .iter_mut()
            .find(|h| h.name() == name)
            .ok_or_else(|| HerdsmanError::UnknownWorkload(name.to_string()))?;
        handle.kill()
    }

    /// Observe every handle until all are terminal.
    pub async fn monitor(&mut self) -> Result<MonitorReport> {
        let span = self.span.clone();
        monitor::monitor(&mut self.handles, &self.options)
            .instrument(span)
            .await
    }

    /// Create, start and monitor `references` to completion.
    pub async fn run(mut self, references: Vec<WorkloadReference>) -> Result<RunSummary> {
        self.create_all(references)?;
        self.start_all()?;
        let report = self.monitor().await?;

        let span = self.span.clone();
        let summary = RunSummary {
            handles: self.handles,
            report,
        };
        info!(
            parent: &span,
            completed = summary.count(WorkloadStatus::Completed),
            failed = summary.count(WorkloadStatus::Failed),
            killed = summary.count(WorkloadStatus::Killed),
            "all workloads finished"
        );
        Ok(summary)
    }
}

/// Final registry of a run plus what the monitor saw.
#[derive(Debug)]
pub struct RunSummary {
    pub handles: Vec<Handle>,
    pub report: MonitorReport,
}

impl RunSummary {
    pub fn count(&self, status: WorkloadStatus) -> usize {
        self.handles.iter().filter(|h| h.status() == status).count()
    }

    pub fn all_completed(&self) -> bool {
        self.handles
            .iter()
            .all(|h| h.status() == WorkloadStatus::Completed)
    }

    pub fn handle(&self, name: &str) -> Option<&Handle> {
        self.handles.iter().find(|h| h.name() == name)
    }

    pub fn records(&self) -> Vec<StatusRecord> {
        report::records(&self.handles)
    }
}
