//! Doctor: read-only diagnostics for the launch environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use dashlaunch::config::Config;
use dashlaunch::deps::{missing_packages, PackageSpec};
use dashlaunch::launcher::port::port_in_use;
use dashlaunch::runtime::check_runtime;
use dashlaunch::{CommandRunner, SystemRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Err,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Ok => "[ok]",
            Severity::Warn => "[warn]",
            Severity::Err => "[ERR]",
        }
    }
}

pub struct DiagItem {
    pub severity: Severity,
    pub category: &'static str,
    pub message: String,
}

impl DiagItem {
    fn new(severity: Severity, category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
        }
    }
}

pub async fn run_diagnostics(config: &Config, runner: &dyn CommandRunner) -> Vec<DiagItem> {
    let mut diags = Vec::new();

    let runtime_ok = check_python(config, runner, &mut diags).await;
    if runtime_ok {
        check_packages(config, runner, &mut diags).await;
    }
    check_entry_point(config, &mut diags);
    if config.app.check_port {
        check_port(config, &mut diags).await;
    }

    diags
}

async fn check_python(config: &Config, runner: &dyn CommandRunner, diags: &mut Vec<DiagItem>) -> bool {
    match check_runtime(runner, &config.runtime).await {
        Ok(info) => {
            diags.push(DiagItem::new(
                Severity::Ok,
                "python",
                format!("{} ({})", info.version, info.command),
            ));
            true
        }
        Err(e) => {
            diags.push(DiagItem::new(Severity::Err, "python", e.to_string()));
            diags.push(DiagItem::new(
                Severity::Err,
                "python",
                format!("Install Python from {}", config.runtime.download_url),
            ));
            false
        }
    }
}

async fn check_packages(config: &Config, runner: &dyn CommandRunner, diags: &mut Vec<DiagItem>) {
    let packages = PackageSpec::parse_all(&config.dependencies.packages);
    if packages.is_empty() {
        diags.push(DiagItem::new(Severity::Warn, "packages", "No packages declared"));
        return;
    }

    match missing_packages(runner, &config.runtime.command, &packages).await {
        Ok(missing) if missing.is_empty() => {
            diags.push(DiagItem::new(
                Severity::Ok,
                "packages",
                format!("All {} packages importable", packages.len()),
            ));
        }
        Ok(missing) => {
            for p in missing {
                diags.push(DiagItem::new(
                    Severity::Warn,
                    "packages",
                    format!("{} not importable (installed on launch)", p.requirement),
                ));
            }
        }
        Err(e) => {
            diags.push(DiagItem::new(
                Severity::Warn,
                "packages",
                format!("Could not probe packages: {}", e),
            ));
        }
    }
}

fn app_dir(config: &Config) -> PathBuf {
    config
        .app
        .working_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn check_entry_point(config: &Config, diags: &mut Vec<DiagItem>) {
    let dir = app_dir(config);
    if config.app.working_dir.is_some() && !dir.is_dir() {
        diags.push(DiagItem::new(
            Severity::Err,
            "app",
            format!("Working directory does not exist: {}", dir.display()),
        ));
        return;
    }
    check_entry_in(&dir, &config.app.entry_point, diags);
}

pub fn check_entry_in(dir: &Path, entry_point: &str, diags: &mut Vec<DiagItem>) {
    let path = dir.join(entry_point);
    if path.is_file() {
        diags.push(DiagItem::new(
            Severity::Ok,
            "app",
            format!("{} found", path.display()),
        ));
    } else {
        diags.push(DiagItem::new(
            Severity::Warn,
            "app",
            format!("{} not found in {}", entry_point, dir.display()),
        ));
    }
}

async fn check_port(config: &Config, diags: &mut Vec<DiagItem>) {
    let app = &config.app;
    if port_in_use(&app.host, app.port, Duration::from_millis(500)).await {
        diags.push(DiagItem::new(
            Severity::Warn,
            "port",
            format!("Port {} on {} is already in use", app.port, app.host),
        ));
    } else {
        diags.push(DiagItem::new(
            Severity::Ok,
            "port",
            format!("Port {} is free", app.port),
        ));
    }
}

/// CLI entry point.
pub(crate) async fn cmd_doctor(config: &Config) -> Result<()> {
    let diags = run_diagnostics(config, &SystemRunner).await;

    println!("Dashboard Doctor");
    println!("================");
    println!();

    let mut current_category = "";
    for diag in &diags {
        if diag.category != current_category {
            if !current_category.is_empty() {
                println!();
            }
            current_category = diag.category;
        }
        println!(
            "{:<6} {:<10} {}",
            diag.severity.icon(),
            diag.category,
            diag.message
        );
    }

    println!();
    let errors = diags.iter().filter(|d| d.severity == Severity::Err).count();
    let warnings = diags
        .iter()
        .filter(|d| d.severity == Severity::Warn)
        .count();
    let ok = diags.iter().filter(|d| d.severity == Severity::Ok).count();
    println!("{} ok, {} warnings, {} errors", ok, warnings, errors);

    if errors > 0 {
        println!();
        println!("Fix the errors above before launching the dashboard.");
    }

    Ok(())
}
