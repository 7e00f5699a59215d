//! Bootstrap launcher: check the runtime, install packages, run the dashboard.
//!
//! The sequence is strictly linear. A missing runtime or a failed install
//! prints a diagnostic, waits for acknowledgement and ends with exit code 1;
//! nothing is retried.

pub mod port;
pub mod stage;

pub use stage::Stage;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::console::Console;
use crate::deps::{install_dependencies, InstallOutcome};
use crate::error::{LaunchError, Result};
use crate::log_component;
use crate::process::{CommandRunner, CommandSpec, ForegroundExit, OutputMode};
use crate::runtime::check_runtime;

const BANNER_RULE: &str = "==================================================";

/// Drives one bootstrap run.
pub struct Launcher {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    console: Arc<dyn Console>,
    stage: Stage,
}

impl Launcher {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>, console: Arc<dyn Console>) -> Self {
        Self {
            config,
            runner,
            console,
            stage: Stage::Start,
        }
    }

    /// Current state machine position.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        log_component!(
            debug,
            "launcher",
            "stage transition",
            from = tracing::field::display(self.stage),
            to = tracing::field::display(next)
        );
        self.stage = next;
    }

    /// Run the whole sequence and return the process exit code.
    pub async fn run(&mut self) -> i32 {
        let code = match self.execute().await {
            Ok(code) => code,
            Err(e) => {
                log_component!(
                    error,
                    "launcher",
                    "bootstrap failed",
                    error = tracing::field::display(&e)
                );
                self.advance(Stage::FailExit);
                self.report_failure(&e);
                self.console.pause();
                e.exit_code()
            }
        };
        debug_assert!(
            self.stage.is_terminal(),
            "run ended in stage {}",
            self.stage
        );
        code
    }

    async fn execute(&mut self) -> Result<i32> {
        self.advance(Stage::CheckRuntime);
        self.check_runtime().await?;

        self.advance(Stage::InstallDeps);
        self.install_dependencies().await?;

        self.advance(Stage::Launch);
        self.launch_application().await
    }

    async fn check_runtime(&self) -> Result<()> {
        self.console.line("Checking for Python...");
        let info = check_runtime(self.runner.as_ref(), &self.config.runtime).await?;
        let version = if info.version.is_empty() {
            info.command.clone()
        } else {
            info.version
        };
        self.console.line(&format!("[OK] {} found", version));
        Ok(())
    }

    async fn install_dependencies(&self) -> Result<()> {
        let deps = &self.config.dependencies;
        self.console.line("");
        if !deps.packages.is_empty() {
            self.console.line(&format!(
                "Installing required packages ({})...",
                deps.packages.join(", ")
            ));
        }

        let outcome =
            install_dependencies(self.runner.as_ref(), &self.config.runtime.command, deps).await?;
        match outcome {
            InstallOutcome::Installed => self.console.line("[OK] Packages installed"),
            InstallOutcome::AlreadyPresent => {
                self.console.line("[OK] All packages are already installed")
            }
            InstallOutcome::NothingToInstall => self.console.line("[OK] No packages to install"),
        }
        Ok(())
    }

    /// Directory the dashboard runs in, if overridden.
    fn working_dir(&self) -> Result<Option<PathBuf>> {
        match &self.config.app.working_dir {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                if !dir.is_dir() {
                    return Err(LaunchError::Config(format!(
                        "app.working_dir does not exist: {}",
                        dir.display()
                    )));
                }
                Ok(Some(dir))
            }
            None => Ok(None),
        }
    }

    /// `python -m streamlit run <entry> --server.port <port> --server.address <host>`
    pub fn launch_spec(&self, cwd: Option<PathBuf>) -> CommandSpec {
        let app = &self.config.app;
        CommandSpec::new(
            &self.config.runtime.command,
            [
                "-m".to_string(),
                "streamlit".to_string(),
                "run".to_string(),
                app.entry_point.clone(),
                "--server.port".to_string(),
                app.port.to_string(),
                "--server.address".to_string(),
                app.host.clone(),
            ],
        )
        .cwd(cwd)
        .stdout(OutputMode::Inherit)
        .stderr(OutputMode::Inherit)
    }

    async fn preflight_warnings(&self, cwd: Option<&PathBuf>) {
        let app = &self.config.app;

        let base = cwd
            .cloned()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        if !base.join(&app.entry_point).exists() {
            self.console.line(&format!(
                "[WARN] {} not found in {}",
                app.entry_point,
                base.display()
            ));
        }

        if app.check_port
            && port::port_in_use(&app.host, app.port, Duration::from_millis(500)).await
        {
            log_component!(warn, "launcher", "port already in use", port = app.port);
            self.console.line(&format!(
                "[WARN] Port {} is already in use; the dashboard may fail to start",
                app.port
            ));
        }
    }

    async fn launch_application(&mut self) -> Result<i32> {
        let cwd = self.working_dir()?;
        self.preflight_warnings(cwd.as_ref()).await;

        let url = self.config.app.url();
        self.console.line("");
        self.console.line(BANNER_RULE);
        self.console.line("Starting Dashboard");
        self.console.line(BANNER_RULE);
        self.console.line("");
        self.console.line(&format!("Open {} in your browser.", url));
        self.console.line("Press Ctrl+C to stop the dashboard.");
        self.console.line("");

        let spec = self.launch_spec(cwd);
        let grace = Duration::from_secs(self.config.launcher.shutdown_grace_secs);

        let child = self.runner.spawn_foreground(&spec).await?;
        self.advance(Stage::Running);
        log_component!(
            info,
            "launcher",
            "dashboard started",
            url = tracing::field::display(&url)
        );
        let exit = match child.wait(grace).await {
            Ok(exit) => exit,
            Err(e) => {
                log_component!(
                    warn,
                    "launcher",
                    "lost track of dashboard process",
                    error = tracing::field::display(&e)
                );
                ForegroundExit {
                    code: None,
                    interrupted: false,
                }
            }
        };
        self.advance(Stage::Terminated);

        if exit.interrupted {
            self.console.line("");
            self.console.line("Dashboard stopped.");
        }
        log_component!(
            info,
            "launcher",
            "dashboard exited",
            code = tracing::field::debug(exit.code)
        );
        self.console.pause();

        Ok(match exit.code {
            Some(code) => code,
            None if exit.interrupted => 0,
            None => 1,
        })
    }

    fn report_failure(&self, err: &LaunchError) {
        match err {
            LaunchError::RuntimeMissing { command } => {
                self.console.error(&format!(
                    "[ERROR] Python is not installed or '{}' is not on PATH.",
                    command
                ));
                self.console.error(&format!(
                    "Install Python from {}",
                    self.config.runtime.download_url
                ));
                self.console
                    .error("and enable \"Add python.exe to PATH\" during setup.");
            }
            LaunchError::DependencyInstallFailed { packages, .. } => {
                self.console.error(&format!("[ERROR] {}", err));
                self.console.error(&format!(
                    "Check your internet connection, then try: {} -m pip install {}",
                    self.config.runtime.command,
                    packages.join(" ")
                ));
            }
            other => self.console.error(&format!("[ERROR] {}", other)),
        }
    }
}
