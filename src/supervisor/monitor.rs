// src/supervisor/monitor.rs

//! Event-driven monitor loop.
//!
//! Every running handle's exit channel is awaited on its own task inside a
//! `JoinSet`; the loop drains whichever finishes first, applies the outcome
//! to its handle and logs it exactly once. A ticker emits one liveness line
//! per still-running handle every `liveness_interval`. The loop ends when,
//! and only when, every handle is terminal.

use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::errors::Result;
use crate::exec::ExitOutcome;
use crate::handle::Handle;
use crate::types::WorkloadStatus;
use crate::workload::WorkloadName;

/// Default gap between liveness observations of a running workload.
pub const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_secs(60);

/// Longest accepted gap between liveness observations.
pub const MAX_LIVENESS_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub liveness_interval: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            liveness_interval: DEFAULT_LIVENESS_INTERVAL,
        }
    }
}

/// What the monitor observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Workload names in the order their terminal state was observed.
    pub completion_order: Vec<WorkloadName>,
    /// Number of "is running" observations logged.
    pub liveness_observations: usize,
}

/// Observe `handles` until every one of them is terminal.
///
/// Handles must already be started; a `NotStarted` handle is an
/// `InvalidTransition`.
pub async fn monitor(handles: &mut [Handle], options: &MonitorOptions) -> Result<MonitorReport> {
    let mut report = MonitorReport::default();
    let mut waiters = JoinSet::new();

    for (index, handle) in handles.iter_mut().enumerate() {
        match handle.status() {
            WorkloadStatus::NotStarted => return Err(handle.invalid("monitor")),
            WorkloadStatus::Running => {
                let exit = handle
                    .take_exit()
                    .ok_or_else(|| handle.invalid("monitor an already awaited workload"))?;
                waiters.spawn(async move { (index, exit.await) });
            }
            WorkloadStatus::Completed | WorkloadStatus::Failed | WorkloadStatus::Killed => {
                handle.log_status();
                report.completion_order.push(handle.name().to_string());
            }
        }
    }

    let period = options
        .liveness_interval
        .clamp(Duration::from_millis(1), MAX_LIVENESS_INTERVAL);
    let mut liveness = time::interval_at(time::Instant::now() + period, period);
    liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !waiters.is_empty() {
        tokio::select! {
            joined = waiters.join_next() => {
                let Some(joined) = joined else { break };
                let (index, received) =
                    joined.map_err(|e| anyhow!("exit waiter task failed: {e}"))?;
                let outcome = received.unwrap_or_else(|_| {
                    ExitOutcome::WaitError(
                        "process runner stopped without reporting an exit".to_string(),
                    )
                });

                let handle = &mut handles[index];
                handle.record_exit(outcome)?;
                handle.log_status();
                report.completion_order.push(handle.name().to_string());
            }

            _ = liveness.tick() => {
                for handle in handles.iter().filter(|h| h.status() == WorkloadStatus::Running) {
                    handle.log_status();
                    report.liveness_observations += 1;
                }
            }
        }
    }

    debug!(
        completed = report.completion_order.len(),
        liveness_observations = report.liveness_observations,
        "all workloads terminal"
    );
    Ok(report)
}
