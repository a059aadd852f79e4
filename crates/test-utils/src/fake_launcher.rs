use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use herdsman::errors::{HerdsmanError, Result};
use herdsman::exec::{ExitOutcome, LaunchedProcess, ProcessControl, ProcessLauncher};
use herdsman::workload::EntryPoint;

/// What a fake "process" does once launched.
#[derive(Debug, Clone)]
pub enum Script {
    /// Report `outcome` after `after` has elapsed (unless killed first).
    Exit { after: Duration, outcome: ExitOutcome },
    /// Never exit on its own; only a kill ends it.
    Hang,
    /// `launch` itself fails, as if the program did not exist.
    RefuseSpawn(String),
}

/// A fake launcher that:
/// - records which workloads were launched, in order
/// - plays a per-workload [`Script`] instead of spawning a process
/// - honours kill requests like a real process runner would
///
/// Workloads without a script exit successfully right away.
#[derive(Debug, Clone)]
pub struct FakeLauncher {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    launched: Arc<Mutex<Vec<String>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn script(self, workload: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(workload.to_string(), script);
        self
    }

    pub fn succeed_after(self, workload: &str, after: Duration) -> Self {
        self.script(
            workload,
            Script::Exit {
                after,
                outcome: ExitOutcome::Exited(0),
            },
        )
    }

    pub fn exit_with(self, workload: &str, code: i32, after: Duration) -> Self {
        self.script(
            workload,
            Script::Exit {
                after,
                outcome: ExitOutcome::Exited(code),
            },
        )
    }

    pub fn hang(self, workload: &str) -> Self {
        self.script(workload, Script::Hang)
    }

    pub fn refuse_spawn(self, workload: &str, reason: &str) -> Self {
        self.script(workload, Script::RefuseSpawn(reason.to_string()))
    }

    /// Names passed to `launch`, in call order.
    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, workload: &str, _entry: &EntryPoint) -> Result<LaunchedProcess> {
        let pid = {
            let mut launched = self.launched.lock().unwrap();
            launched.push(workload.to_string());
            10_000 + launched.len() as u32
        };

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(workload)
            .cloned()
            .unwrap_or(Script::Exit {
                after: Duration::ZERO,
                outcome: ExitOutcome::Exited(0),
            });

        if let Script::RefuseSpawn(reason) = script {
            return Err(HerdsmanError::Spawn {
                workload: workload.to_string(),
                reason,
            });
        }

        let (launched, control) = LaunchedProcess::pair(Some(pid));
        tokio::spawn(play(script, control));
        Ok(launched)
    }
}

async fn play(script: Script, control: ProcessControl) {
    let ProcessControl { exit, mut kill } = control;

    let outcome = match script {
        Script::Exit { after, outcome } => {
            tokio::select! {
                _ = tokio::time::sleep(after) => outcome,
                requested = &mut kill => match requested {
                    Ok(()) => ExitOutcome::Killed,
                    // Handle dropped: nobody is listening any more.
                    Err(_) => return,
                },
            }
        }
        Script::Hang => match kill.await {
            Ok(()) => ExitOutcome::Killed,
            Err(_) => return,
        },
        Script::RefuseSpawn(_) => return,
    };

    let _ = exit.send(outcome);
}
