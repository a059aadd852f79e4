use std::fmt;

use serde::Serialize;

/// Lifecycle status of one workload.
///
/// Every workload walks `NotStarted -> Running -> {Completed|Failed|Killed}`
/// exactly once. The last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkloadStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
    Killed,
}

impl WorkloadStatus {
    pub fn is_terminal(self) -> bool {
        match self {
            WorkloadStatus::NotStarted | WorkloadStatus::Running => false,
            WorkloadStatus::Completed | WorkloadStatus::Failed | WorkloadStatus::Killed => true,
        }
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: WorkloadStatus) -> bool {
        match (self, next) {
            (WorkloadStatus::NotStarted, WorkloadStatus::Running) => true,
            (WorkloadStatus::Running, WorkloadStatus::Completed)
            | (WorkloadStatus::Running, WorkloadStatus::Failed)
            | (WorkloadStatus::Running, WorkloadStatus::Killed) => true,
            (WorkloadStatus::NotStarted, _)
            | (WorkloadStatus::Running, _)
            | (WorkloadStatus::Completed, _)
            | (WorkloadStatus::Failed, _)
            | (WorkloadStatus::Killed, _) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadStatus::NotStarted => "NotStarted",
            WorkloadStatus::Running => "Running",
            WorkloadStatus::Completed => "Completed",
            WorkloadStatus::Failed => "Failed",
            WorkloadStatus::Killed => "Killed",
        }
    }
}

impl fmt::Display for WorkloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [WorkloadStatus; 5] = [
        WorkloadStatus::NotStarted,
        WorkloadStatus::Running,
        WorkloadStatus::Completed,
        WorkloadStatus::Failed,
        WorkloadStatus::Killed,
    ];

    #[test]
    fn only_forward_transitions_through_running_are_legal() {
        let mut legal = Vec::new();
        for from in ALL {
            for to in ALL {
                if from.can_transition_to(to) {
                    legal.push((from, to));
                }
            }
        }

        assert_eq!(
            legal,
            vec![
                (WorkloadStatus::NotStarted, WorkloadStatus::Running),
                (WorkloadStatus::Running, WorkloadStatus::Completed),
                (WorkloadStatus::Running, WorkloadStatus::Failed),
                (WorkloadStatus::Running, WorkloadStatus::Killed),
            ]
        );
    }

    #[test]
    fn terminal_states_are_the_last_three() {
        let terminal: Vec<_> = ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(
            terminal,
            vec![
                WorkloadStatus::Completed,
                WorkloadStatus::Failed,
                WorkloadStatus::Killed
            ]
        );
    }
}
