//! pip-driven installation of the dashboard's packages.

use tracing::{debug, info, warn};

use crate::config::DependenciesConfig;
use crate::error::{LaunchError, Result};
use crate::process::{CommandRunner, CommandSpec, OutputMode};

use super::types::{import_probe_script, PackageSpec};

/// What the installer ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// `pip install` ran and exited 0.
    Installed,
    /// Every package already imported; pip was not run.
    AlreadyPresent,
    /// No packages are declared.
    NothingToInstall,
}

/// `python -m pip install --upgrade pip`, output discarded.
fn upgrade_spec(runtime: &str) -> CommandSpec {
    CommandSpec::new(runtime, ["-m", "pip", "install", "--upgrade", "pip"])
        .stdout(OutputMode::Null)
        .stderr(OutputMode::Null)
}

/// `python -m pip install --quiet <packages...>`; pip's errors stay visible.
fn install_spec(runtime: &str, packages: &[PackageSpec]) -> CommandSpec {
    let mut args = vec![
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
        "--quiet".to_string(),
    ];
    args.extend(packages.iter().map(|p| p.requirement.clone()));
    CommandSpec::new(runtime, args)
        .stdout(OutputMode::Null)
        .stderr(OutputMode::Inherit)
}

/// `python -c "import a, b, c"`, output captured.
fn probe_spec(runtime: &str, packages: &[PackageSpec]) -> CommandSpec {
    CommandSpec::new(runtime, ["-c".to_string(), import_probe_script(packages)])
}

/// Upgrade pip (best-effort), then install the declared packages.
///
/// Upgrade failures of any kind are ignored. A non-zero exit from the
/// install step is [`LaunchError::DependencyInstallFailed`].
pub async fn install_dependencies(
    runner: &dyn CommandRunner,
    runtime: &str,
    cfg: &DependenciesConfig,
) -> Result<InstallOutcome> {
    let packages = PackageSpec::parse_all(&cfg.packages);
    if packages.is_empty() {
        info!("No packages declared, skipping installation");
        return Ok(InstallOutcome::NothingToInstall);
    }

    if cfg.skip_if_importable && missing_packages(runner, runtime, &packages).await?.is_empty() {
        info!("All {} packages already importable", packages.len());
        return Ok(InstallOutcome::AlreadyPresent);
    }

    if cfg.upgrade_installer {
        match runner.output(&upgrade_spec(runtime)).await {
            Ok(out) if out.success() => debug!("pip upgraded"),
            Ok(out) => debug!("pip upgrade exited with {:?}, ignoring", out.code),
            Err(e) => debug!("pip upgrade could not run, ignoring: {}", e),
        }
    }

    let spec = install_spec(runtime, &packages);
    info!(command = %spec.display(), "installing packages");
    let out = runner.output(&spec).await?;
    if !out.success() {
        warn!("pip install exited with {:?}", out.code);
        return Err(LaunchError::DependencyInstallFailed {
            packages: packages.into_iter().map(|p| p.requirement).collect(),
            code: out.code,
        });
    }

    info!("Installed {} packages", packages.len());
    Ok(InstallOutcome::Installed)
}

/// Packages that do not import under `runtime`.
///
/// One combined probe answers the common all-present case; only when it
/// fails is each module probed on its own.
pub async fn missing_packages(
    runner: &dyn CommandRunner,
    runtime: &str,
    packages: &[PackageSpec],
) -> Result<Vec<PackageSpec>> {
    if packages.is_empty() {
        return Ok(Vec::new());
    }
    if runner.output(&probe_spec(runtime, packages)).await?.success() {
        return Ok(Vec::new());
    }

    let mut missing = Vec::new();
    for package in packages {
        let out = runner
            .output(&probe_spec(runtime, std::slice::from_ref(package)))
            .await?;
        if !out.success() {
            debug!(module = %package.module, "import failed: {}", out.stderr.trim());
            missing.push(package.clone());
        }
    }
    Ok(missing)
}
