//! Dependency installation: pip packages the dashboard imports.
//!
//! The installer upgrades pip (best-effort) and then installs the declared
//! packages in one `pip install` call. Only the second step can fail the
//! bootstrap.

pub mod installer;
pub mod types;

pub use installer::{install_dependencies, missing_packages, InstallOutcome};
pub use types::PackageSpec;
