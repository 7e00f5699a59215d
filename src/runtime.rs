//! Runtime detection.
//!
//! The interpreter counts as installed when `<command> --version` can be
//! spawned and exits 0. Anything else is [`LaunchError::RuntimeMissing`].

use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{LaunchError, Result};
use crate::process::{CommandRunner, CommandSpec};

/// A detected interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeInfo {
    /// Command used to invoke it.
    pub command: String,
    /// Version banner as printed, e.g. `Python 3.12.1`.
    pub version: String,
}

/// Extract the version banner from `--version` output.
///
/// Python 3 prints to stdout; Python 2 printed to stderr.
fn version_banner(stdout: &str, stderr: &str) -> String {
    let pick = if stdout.trim().is_empty() { stderr } else { stdout };
    pick.lines().next().unwrap_or("").trim().to_string()
}

/// Check that the configured runtime is installed.
pub async fn check_runtime(runner: &dyn CommandRunner, cfg: &RuntimeConfig) -> Result<RuntimeInfo> {
    let spec = CommandSpec::new(&cfg.command, ["--version"]);
    let missing = || LaunchError::RuntimeMissing {
        command: cfg.command.clone(),
    };

    let output = match runner.output(&spec).await {
        Ok(o) => o,
        Err(LaunchError::Spawn { source, .. }) => {
            debug!("'{}' could not be spawned: {}", cfg.command, source);
            return Err(missing());
        }
        Err(e) => return Err(e),
    };

    if !output.success() {
        debug!(
            "'{}' --version exited with {:?}: {}",
            cfg.command,
            output.code,
            output.stderr.trim()
        );
        return Err(missing());
    }

    let info = RuntimeInfo {
        command: cfg.command.clone(),
        version: version_banner(&output.stdout, &output.stderr),
    };
    info!(command = %info.command, version = %info.version, "runtime found");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockRunner};

    fn cfg() -> RuntimeConfig {
        RuntimeConfig {
            command: "python".into(),
            download_url: "https://www.python.org/downloads/".into(),
        }
    }

    #[test]
    fn test_version_banner_prefers_stdout() {
        assert_eq!(version_banner("Python 3.12.1\n", ""), "Python 3.12.1");
        assert_eq!(version_banner("", "Python 2.7.18\n"), "Python 2.7.18");
        assert_eq!(version_banner("  ", "  "), "");
    }

    #[tokio::test]
    async fn test_runtime_present() {
        let runner = MockRunner::new().then(Ok(CommandOutput {
            code: Some(0),
            stdout: "Python 3.11.4\n".into(),
            stderr: String::new(),
        }));
        let info = check_runtime(&runner, &cfg()).await.unwrap();
        assert_eq!(info.command, "python");
        assert_eq!(info.version, "Python 3.11.4");
        assert_eq!(runner.call_args(), vec![vec!["--version".to_string()]]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_missing() {
        // The Windows Store alias exits 9009 when Python is not installed.
        let runner = MockRunner::new().then_exit(9009);
        let err = check_runtime(&runner, &cfg()).await.unwrap_err();
        assert!(matches!(err, LaunchError::RuntimeMissing { ref command } if command == "python"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_missing() {
        let runner = MockRunner::new().then_not_found("python");
        let err = check_runtime(&runner, &cfg()).await.unwrap_err();
        assert!(matches!(err, LaunchError::RuntimeMissing { .. }));
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let runner = MockRunner::new().then(Err(LaunchError::Config("boom".into())));
        let err = check_runtime(&runner, &cfg()).await.unwrap_err();
        assert!(matches!(err, LaunchError::Config(_)));
    }
}
