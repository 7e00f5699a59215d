//! Command runner trait and implementations.
//!
//! `CommandRunner` abstracts process spawning for testability.
//! `SystemRunner` spawns real processes with `tokio::process`.
//! `MockRunner` is used in tests.

use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::error::{LaunchError, Result};

/// Where a child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the launcher's console.
    Inherit,
    /// Discard.
    Null,
    /// Collect into [`CommandOutput`].
    Capture,
}

impl OutputMode {
    fn stdio(self) -> Stdio {
        match self {
            OutputMode::Inherit => Stdio::inherit(),
            OutputMode::Null => Stdio::null(),
            OutputMode::Capture => Stdio::piped(),
        }
    }
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdout: OutputMode,
    pub stderr: OutputMode,
}

impl CommandSpec {
    /// Command with captured output and no working directory override.
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            stdout: OutputMode::Capture,
            stderr: OutputMode::Capture,
        }
    }

    pub fn stdout(mut self, mode: OutputMode) -> Self {
        self.stdout = mode;
        self
    }

    pub fn stderr(mut self, mode: OutputMode) -> Self {
        self.stderr = mode;
        self
    }

    pub fn cwd(mut self, dir: Option<PathBuf>) -> Self {
        self.cwd = dir;
        self
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().map(|a| {
            if a.contains(' ') {
                format!("\"{}\"", a)
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }

    fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdout(self.stdout.stdio())
            .stderr(self.stderr.stdio());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited with `code` and printed nothing.
    #[cfg(test)]
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstracts the actual process spawning.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, collecting whatever `spec` captures.
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Start a command that shares the launcher's console.
    ///
    /// Only spawning happens here; [`ForegroundChild::wait`] runs it to the end.
    async fn spawn_foreground(&self, spec: &CommandSpec) -> Result<Box<dyn ForegroundChild>>;
}

/// A spawned foreground command.
#[async_trait]
pub trait ForegroundChild: Send {
    /// Wait until the child exits or the user presses Ctrl+C. After an
    /// interrupt the child gets `grace` to exit on its own before it is
    /// killed.
    async fn wait(self: Box<Self>, grace: Duration) -> Result<ForegroundExit>;
}

/// How a foreground child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForegroundExit {
    /// Exit code, `None` when terminated by a signal or killed by the launcher.
    pub code: Option<i32>,
    /// The user pressed Ctrl+C while the child was running.
    pub interrupted: bool,
}

/// Real runner backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> LaunchError {
    LaunchError::Spawn {
        program: spec.program.clone(),
        source,
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec.display(), "running");
        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(spec, e))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn spawn_foreground(&self, spec: &CommandSpec) -> Result<Box<dyn ForegroundChild>> {
        let child = spec
            .to_command()
            .stdin(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(spec, e))?;
        info!(pid = child.id().unwrap_or(0), command = %spec.display(), "child started");
        Ok(Box::new(SystemChild { child }))
    }
}

/// Child spawned by [`SystemRunner`].
struct SystemChild {
    child: Child,
}

#[async_trait]
impl ForegroundChild for SystemChild {
    async fn wait(self: Box<Self>, grace: Duration) -> Result<ForegroundExit> {
        wait_until(self.child, grace, tokio::signal::ctrl_c()).await
    }
}

/// Wait for `child`, treating completion of `shutdown` as the user's interrupt.
///
/// A child still running `grace` after the interrupt is killed and reported
/// with `code: None`, whatever status the platform assigns to a killed process.
pub async fn wait_until<F>(mut child: Child, grace: Duration, shutdown: F) -> Result<ForegroundExit>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        biased;
        signal = shutdown => {
            if let Err(e) = signal {
                // Without a signal handler just wait for the child.
                warn!("Failed to listen for Ctrl+C: {}", e);
                let status = child.wait().await?;
                return Ok(ForegroundExit { code: status.code(), interrupted: false });
            }
        }
        status = child.wait() => {
            let status = status?;
            return Ok(ForegroundExit { code: status.code(), interrupted: false });
        }
    }

    // The child shares the console and received the same interrupt.
    info!("interrupt received, waiting up to {:?} for child", grace);
    let code = match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status?.code(),
        Err(_) => {
            warn!("child did not exit within {:?}, killing it", grace);
            child.kill().await?;
            None
        }
    };
    Ok(ForegroundExit {
        code,
        interrupted: true,
    })
}

/// Mock runner for tests.
///
/// Responses are consumed in call order; every spec is recorded.
#[cfg(test)]
pub struct MockRunner {
    pub responses: std::sync::Mutex<std::collections::VecDeque<Result<CommandOutput>>>,
    pub foreground_result: std::sync::Mutex<Option<Result<ForegroundExit>>>,
    pub calls: std::sync::Mutex<Vec<CommandSpec>>,
}

#[cfg(test)]
impl MockRunner {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
            foreground_result: std::sync::Mutex::new(None),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queue the result of the next `output` call.
    pub fn then(self, result: Result<CommandOutput>) -> Self {
        self.responses.lock().unwrap().push_back(result);
        self
    }

    /// Queue a plain exit code for the next `output` call.
    pub fn then_exit(self, code: i32) -> Self {
        self.then(Ok(CommandOutput::exited(code)))
    }

    /// Queue a spawn failure (program not found) for the next `output` call.
    pub fn then_not_found(self, program: &str) -> Self {
        self.then(Err(LaunchError::Spawn {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }))
    }

    /// How the foreground child ends once spawned.
    pub fn with_foreground(self, code: Option<i32>, interrupted: bool) -> Self {
        *self.foreground_result.lock().unwrap() = Some(Ok(ForegroundExit { code, interrupted }));
        self
    }

    /// Make the foreground spawn fail.
    pub fn with_foreground_not_found(self, program: &str) -> Self {
        *self.foreground_result.lock().unwrap() = Some(Err(LaunchError::Spawn {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded argument lists, for terse assertions.
    pub fn call_args(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.args).collect()
    }
}

#[cfg(test)]
struct MockChild(ForegroundExit);

#[cfg(test)]
#[async_trait]
impl ForegroundChild for MockChild {
    async fn wait(self: Box<Self>, _grace: Duration) -> Result<ForegroundExit> {
        Ok(self.0)
    }
}

#[cfg(test)]
#[async_trait]
impl CommandRunner for MockRunner {
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LaunchError::Config("No mock result configured".to_string())))
    }

    async fn spawn_foreground(&self, spec: &CommandSpec) -> Result<Box<dyn ForegroundChild>> {
        self.calls.lock().unwrap().push(spec.clone());
        let result = self
            .foreground_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(LaunchError::Config("No mock result configured".to_string())));
        let exit = result?;
        Ok(Box::new(MockChild(exit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults_capture() {
        let spec = CommandSpec::new("python", ["--version"]);
        assert_eq!(spec.program, "python");
        assert_eq!(spec.args, vec!["--version"]);
        assert_eq!(spec.stdout, OutputMode::Capture);
        assert_eq!(spec.stderr, OutputMode::Capture);
        assert!(spec.cwd.is_none());
    }

    #[test]
    fn test_spec_display_quotes_spaces() {
        let spec = CommandSpec::new("python", ["-m", "streamlit", "run", "my app.py"]);
        assert_eq!(spec.display(), "python -m streamlit run \"my app.py\"");
    }

    #[test]
    fn test_command_output_success() {
        assert!(CommandOutput::exited(0).success());
        assert!(!CommandOutput::exited(1).success());
        assert!(!CommandOutput::default().success());
    }

    #[tokio::test]
    async fn test_mock_runner_replays_in_order() {
        let runner = MockRunner::new().then_exit(0).then_exit(3);
        let spec = CommandSpec::new("x", ["a"]);
        assert_eq!(runner.output(&spec).await.unwrap().code, Some(0));
        assert_eq!(runner.output(&spec).await.unwrap().code, Some(3));
        assert!(runner.output(&spec).await.is_err());
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_runner_foreground() {
        let runner = MockRunner::new().with_foreground(Some(0), true);
        let spec = CommandSpec::new("x", Vec::<String>::new());
        let child = runner.spawn_foreground(&spec).await.unwrap();
        let exit = child.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(exit.code, Some(0));
        assert!(exit.interrupted);
    }

    #[tokio::test]
    async fn test_mock_runner_foreground_spawn_failure() {
        let runner = MockRunner::new().with_foreground_not_found("python");
        let spec = CommandSpec::new("python", Vec::<String>::new());
        assert!(matches!(
            runner.spawn_foreground(&spec).await,
            Err(LaunchError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let spec = CommandSpec::new("sh", ["-c", "echo hello; echo oops >&2; exit 4"]);
        let out = SystemRunner.output(&spec).await.unwrap();
        assert_eq!(out.code, Some(4));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_respects_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let spec =
            CommandSpec::new("sh", ["-c", "pwd"]).cwd(Some(dir.path().to_path_buf()));
        let out = SystemRunner.output(&spec).await.unwrap();
        let reported = std::path::PathBuf::from(out.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let spec = CommandSpec::new("nonexistent_program_xyz_123", ["--version"]);
        let err = SystemRunner.output(&spec).await.unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_system_runner_foreground_missing_program() {
        let spec = CommandSpec::new("nonexistent_program_xyz_123", ["run"]);
        assert!(matches!(
            SystemRunner.spawn_foreground(&spec).await,
            Err(LaunchError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_foreground_exit_code() {
        let spec = CommandSpec::new("sh", ["-c", "exit 7"])
            .stdout(OutputMode::Null)
            .stderr(OutputMode::Null);
        let child = SystemRunner.spawn_foreground(&spec).await.unwrap();
        let exit = child.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(exit.code, Some(7));
        assert!(!exit.interrupted);
    }

    #[cfg(unix)]
    fn quiet_child(script: &str) -> Child {
        CommandSpec::new("sh", ["-c", script])
            .stdout(OutputMode::Null)
            .stderr(OutputMode::Null)
            .to_command()
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interrupted_child_exiting_within_grace_keeps_its_code() {
        let child = quiet_child("sleep 0.2; exit 0");
        let exit = wait_until(child, Duration::from_secs(5), std::future::ready(Ok(())))
            .await
            .unwrap();
        assert!(exit.interrupted);
        assert_eq!(exit.code, Some(0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interrupted_child_outliving_grace_is_killed() {
        let child = quiet_child("trap '' INT; exec sleep 30");
        let started = std::time::Instant::now();
        let exit = wait_until(child, Duration::from_millis(100), std::future::ready(Ok(())))
            .await
            .unwrap();
        assert!(exit.interrupted);
        assert_eq!(exit.code, None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_signal_listener_waits_for_child() {
        let child = quiet_child("exit 5");
        let shutdown = std::future::ready(Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no handler",
        )));
        let exit = wait_until(child, Duration::from_millis(100), shutdown)
            .await
            .unwrap();
        assert!(!exit.interrupted);
        assert_eq!(exit.code, Some(5));
    }
}
