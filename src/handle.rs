// src/handle.rs

//! Per-workload lifecycle tracker.
//!
//! A [`Handle`] wraps exactly one workload process and walks the
//! [`WorkloadStatus`] state machine:
//!
//! ```text
//! NotStarted --start--> Running --exit--> Completed | Failed | Killed
//! ```
//!
//! Every transition goes through [`Handle::transition`], which rejects
//! anything [`WorkloadStatus::can_transition_to`] does not allow. A spawn
//! failure still passes through `Running` before landing in `Failed`.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeDelta};
use tokio::sync::oneshot;
use tracing::{Span, debug, error, info, info_span};

use crate::errors::{HerdsmanError, Result};
use crate::exec::{ExitOutcome, ProcessLauncher};
use crate::types::WorkloadStatus;
use crate::workload::{EntryPoint, WorkloadName, WorkloadReference};

#[derive(Debug)]
pub struct Handle {
    name: WorkloadName,
    entry: EntryPoint,
    status: WorkloadStatus,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
    /// Monotonic clock reading taken together with `start_time`.
    started_at: Option<Instant>,
    run_duration: Duration,
    failure: Option<String>,
    pid: Option<u32>,
    exit: Option<oneshot::Receiver<ExitOutcome>>,
    kill: Option<oneshot::Sender<()>>,
    span: Span,
}

impl Handle {
    pub fn new(reference: WorkloadReference) -> Self {
        let span = info_span!("workload", name = %reference.name);
        Self::with_span(reference, span)
    }

    /// Create a handle whose log lines are nested under `parent`.
    pub fn with_parent(reference: WorkloadReference, parent: &Span) -> Self {
        let span = info_span!(parent: parent, "workload", name = %reference.name);
        Self::with_span(reference, span)
    }

    fn with_span(reference: WorkloadReference, span: Span) -> Self {
        Self {
            name: reference.name,
            entry: reference.entry,
            status: WorkloadStatus::NotStarted,
            start_time: None,
            end_time: None,
            started_at: None,
            run_duration: Duration::ZERO,
            failure: None,
            pid: None,
            exit: None,
            kill: None,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &EntryPoint {
        &self.entry
    }

    pub fn status(&self) -> WorkloadStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    /// `end_time - start_time` once terminal, zero before.
    pub fn run_duration(&self) -> Duration {
        self.run_duration
    }

    /// Recorded cause for a `Failed` or `Killed` workload.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Start the workload process.
    ///
    /// Only valid from `NotStarted`. If the launcher cannot create the
    /// process the handle ends up `Failed` with the spawn error as its cause;
    /// that is recorded, not returned.
    pub fn start(&mut self, launcher: &dyn ProcessLauncher) -> Result<()> {
        self.transition(WorkloadStatus::Running, "start")?;
        self.start_time = Some(Local::now());
        self.started_at = Some(Instant::now());

        match launcher.launch(&self.name, &self.entry) {
            Ok(process) => {
                self.pid = process.pid;
                self.exit = Some(process.exit);
                self.kill = Some(process.kill);
                info!(parent: &self.span, pid = ?self.pid, "started");
            }
            Err(err) => {
                error!(parent: &self.span, error = %err, "spawn failed");
                self.finish(WorkloadStatus::Failed, Some(err.to_string()))?;
            }
        }

        Ok(())
    }

    /// Wait for the process to exit and record its terminal status.
    ///
    /// Returns the status immediately if the handle is already terminal.
    pub async fn await_completion(&mut self) -> Result<WorkloadStatus> {
        match self.status {
            WorkloadStatus::NotStarted => Err(self.invalid("await completion")),
            WorkloadStatus::Completed | WorkloadStatus::Failed | WorkloadStatus::Killed => {
                Ok(self.status)
            }
            WorkloadStatus::Running => {
                let exit = self
                    .exit
                    .take()
                    .ok_or_else(|| self.invalid("await completion twice"))?;
                let outcome = exit.await.unwrap_or_else(|_| {
                    ExitOutcome::WaitError(
                        "process runner stopped without reporting an exit".to_string(),
                    )
                });
                self.record_exit(outcome)
            }
        }
    }

    /// Ask the process to terminate.
    ///
    /// The status becomes `Killed` once the termination is observed through
    /// [`Handle::await_completion`] or the supervisor's monitor.
    pub fn kill(&mut self) -> Result<()> {
        if self.status != WorkloadStatus::Running {
            return Err(self.invalid("kill"));
        }

        match self.kill.take() {
            Some(kill) => {
                info!(parent: &self.span, "kill requested");
                if kill.send(()).is_err() {
                    debug!(parent: &self.span, "process already ended before kill request");
                }
            }
            None => debug!(parent: &self.span, "kill already requested"),
        }
        Ok(())
    }

    /// Hand the exit channel to an outside waiter (the monitor).
    pub(crate) fn take_exit(&mut self) -> Option<oneshot::Receiver<ExitOutcome>> {
        self.exit.take()
    }

    /// Apply an observed exit outcome.
    pub(crate) fn record_exit(&mut self, outcome: ExitOutcome) -> Result<WorkloadStatus> {
        self.finish(outcome.status(), outcome.cause())?;
        Ok(self.status)
    }

    /// Log the terminal outcome (or a liveness line while running).
    pub fn log_status(&self) {
        match self.status {
            WorkloadStatus::NotStarted => info!(parent: &self.span, "not started"),
            WorkloadStatus::Running => info!(parent: &self.span, "is running"),
            WorkloadStatus::Completed => info!(
                parent: &self.span,
                "completed in {}",
                crate::report::human_duration(self.run_duration)
            ),
            WorkloadStatus::Failed => error!(
                parent: &self.span,
                cause = self.failure.as_deref().unwrap_or("unknown"),
                "failed"
            ),
            WorkloadStatus::Killed => error!(
                parent: &self.span,
                cause = self.failure.as_deref().unwrap_or("unknown"),
                "was killed"
            ),
        }
    }

    fn finish(&mut self, status: WorkloadStatus, cause: Option<String>) -> Result<()> {
        self.transition(status, "finish")?;

        let start = self.start_time.unwrap_or_else(Local::now);
        let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        let delta = TimeDelta::from_std(elapsed).unwrap_or_else(|_| TimeDelta::zero());
        let end = start.checked_add_signed(delta).unwrap_or(start);

        self.end_time = Some(end);
        self.run_duration = (end - start).to_std().unwrap_or_default();
        self.failure = cause;
        self.exit = None;
        self.kill = None;
        Ok(())
    }

    fn transition(&mut self, next: WorkloadStatus, operation: &'static str) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(self.invalid(operation));
        }
        debug!(parent: &self.span, from = %self.status, to = %next, "status transition");
        self.status = next;
        Ok(())
    }

    pub(crate) fn invalid(&self, operation: &'static str) -> HerdsmanError {
        HerdsmanError::InvalidTransition {
            workload: self.name.clone(),
            from: self.status,
            operation,
        }
    }
}
