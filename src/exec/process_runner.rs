// src/exec/process_runner.rs

//! Individual workload process runner.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::exec::ExitOutcome;
use crate::exec::launcher::ProcessControl;

/// How long remaining output may take to arrive once the child has exited.
/// Pipes inherited by background grandchildren can stay open indefinitely.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Own a spawned child until it ends and report how it ended.
///
/// - stdout lines are logged at info, stderr lines at warn, and are drained
///   before a normal exit is reported;
/// - if a kill request arrives first, the child is killed and the outcome is
///   [`ExitOutcome::Killed`];
/// - if the supervisor side disappears, nothing is reported and the child is
///   killed on drop.
pub async fn run_process(workload: String, mut child: Child, control: ProcessControl) {
    let mut forwarders = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        forwarders.push(forward_lines(workload.clone(), stdout, Stream::Stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        forwarders.push(forward_lines(workload.clone(), stderr, Stream::Stderr));
    }

    let ProcessControl {
        exit,
        kill: mut kill_rx,
    } = control;

    let outcome = tokio::select! {
        status = child.wait() => {
            drain(&workload, forwarders).await;
            match status {
                Ok(status) => ExitOutcome::from_exit_status(status),
                Err(e) => ExitOutcome::WaitError(format!("waiting for process: {e}")),
            }
        }

        request = &mut kill_rx => match request {
            Ok(()) => {
                info!(workload = %workload, "kill requested; terminating process");
                match child.kill().await {
                    Ok(()) => ExitOutcome::Killed,
                    Err(e) => {
                        warn!(
                            workload = %workload,
                            error = %e,
                            "failed to kill process; waiting for it instead"
                        );
                        match child.wait().await {
                            Ok(status) => ExitOutcome::from_exit_status(status),
                            Err(e) => ExitOutcome::WaitError(format!("waiting for process: {e}")),
                        }
                    }
                }
            }
            Err(_) => {
                debug!(workload = %workload, "handle dropped; abandoning process");
                return;
            }
        },
    };

    debug!(workload = %workload, ?outcome, "workload process ended");

    if exit.send(outcome).is_err() {
        debug!(workload = %workload, "nobody is waiting for this exit outcome");
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Consume a child pipe on a background task so its buffer never fills.
fn forward_lines<R>(workload: String, pipe: R, stream: Stream) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match stream {
                Stream::Stdout => info!(workload = %workload, "stdout: {}", line),
                Stream::Stderr => warn!(workload = %workload, "stderr: {}", line),
            }
        }
    })
}

async fn drain(workload: &str, forwarders: Vec<JoinHandle<()>>) {
    let all = async {
        for forwarder in forwarders {
            let _ = forwarder.await;
        }
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, all).await.is_err() {
        debug!(workload = %workload, "output still open after exit; not waiting for it");
    }
}
