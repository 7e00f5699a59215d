//! Launcher state machine.
//!
//! `Start → CheckRuntime → {FailExit | InstallDeps} → {FailExit | Launch}
//! → Running → Terminated`. Failure transitions are terminal.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    CheckRuntime,
    InstallDeps,
    Launch,
    Running,
    Terminated,
    FailExit,
}

impl Stage {
    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Start, Stage::CheckRuntime)
                | (Stage::CheckRuntime, Stage::InstallDeps)
                | (Stage::CheckRuntime, Stage::FailExit)
                | (Stage::InstallDeps, Stage::Launch)
                | (Stage::InstallDeps, Stage::FailExit)
                | (Stage::Launch, Stage::Running)
                | (Stage::Launch, Stage::FailExit)
                | (Stage::Running, Stage::Terminated)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Terminated | Stage::FailExit)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::CheckRuntime => "check_runtime",
            Stage::InstallDeps => "install_deps",
            Stage::Launch => "launch",
            Stage::Running => "running",
            Stage::Terminated => "terminated",
            Stage::FailExit => "fail_exit",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_legal() {
        let path = [
            Stage::Start,
            Stage::CheckRuntime,
            Stage::InstallDeps,
            Stage::Launch,
            Stage::Running,
            Stage::Terminated,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_skipping_or_retry() {
        assert!(!Stage::Start.can_advance_to(Stage::InstallDeps));
        assert!(!Stage::CheckRuntime.can_advance_to(Stage::Launch));
        assert!(!Stage::FailExit.can_advance_to(Stage::CheckRuntime));
        assert!(!Stage::Terminated.can_advance_to(Stage::Start));
        assert!(!Stage::Running.can_advance_to(Stage::FailExit));
    }

    #[test]
    fn test_terminal_stages() {
        assert!(Stage::Terminated.is_terminal());
        assert!(Stage::FailExit.is_terminal());
        assert!(!Stage::Running.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::CheckRuntime.to_string(), "check_runtime");
        assert_eq!(Stage::FailExit.to_string(), "fail_exit");
    }
}
