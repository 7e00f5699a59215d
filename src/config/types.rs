//! Configuration type definitions for dashlaunch
//!
//! All types implement serde traits for JSON serialization and have defaults
//! that reproduce the launcher's built-in behavior exactly.

use serde::{Deserialize, Serialize};

/// Main configuration struct for dashlaunch
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Runtime detection (interpreter command, download link)
    pub runtime: RuntimeConfig,
    /// Packages installed before launch
    pub dependencies: DependenciesConfig,
    /// Dashboard application entry point and bind address
    pub app: AppConfig,
    /// Launcher console behavior
    pub launcher: LauncherConfig,
    /// Logging output
    pub logging: LoggingConfig,
}

// ============================================================================
// Runtime
// ============================================================================

/// Default interpreter command for the host platform.
fn default_runtime_command() -> String {
    if cfg!(target_os = "windows") {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

/// Runtime (Python interpreter) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interpreter command looked up on PATH. Console messages still say
    /// "Python", so this should name a Python interpreter (`py`, a venv path).
    pub command: String,
    /// Where to point the user when the runtime is missing
    pub download_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: default_runtime_command(),
            download_url: "https://www.python.org/downloads/".to_string(),
        }
    }
}

// ============================================================================
// Dependencies
// ============================================================================

/// Packages the dashboard needs, in install order.
pub const DEFAULT_PACKAGES: &[&str] = &["streamlit", "pandas", "plotly", "openpyxl"];

/// Dependency installation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependenciesConfig {
    /// Package names passed to `pip install`, versions unconstrained
    pub packages: Vec<String>,
    /// Run `pip install --upgrade pip` first (failures ignored)
    pub upgrade_installer: bool,
    /// Skip both pip steps when every package already imports
    pub skip_if_importable: bool,
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        Self {
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
            upgrade_installer: true,
            skip_if_importable: false,
        }
    }
}

// ============================================================================
// Application
// ============================================================================

/// Dashboard application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Script handed to `streamlit run`
    pub entry_point: String,
    /// Bind address for the dashboard server
    pub host: String,
    /// Bind port for the dashboard server
    pub port: u16,
    /// Directory the dashboard runs in (current directory when unset)
    pub working_dir: Option<String>,
    /// Warn before launch if something already listens on host:port
    pub check_port: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            entry_point: "app.py".to_string(),
            host: "localhost".to_string(),
            port: 8501,
            working_dir: None,
            check_port: true,
        }
    }
}

impl AppConfig {
    /// URL the user opens in a browser.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Launcher
// ============================================================================

/// Launcher console behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Wait for Enter before exiting (only when stdin is a terminal)
    pub pause: bool,
    /// Seconds to wait for the dashboard to exit after Ctrl+C before killing it
    pub shutdown_grace_secs: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            pause: true,
            shutdown_grace_secs: 5,
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable compact text
    Pretty,
    /// `[LEVEL] target message {fields}` with a `component` field
    #[default]
    Component,
    /// JSON lines
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Append logs to this file instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            level: "warn".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builtin_behavior() {
        let config = Config::default();
        assert_eq!(
            config.dependencies.packages,
            vec!["streamlit", "pandas", "plotly", "openpyxl"]
        );
        assert!(config.dependencies.upgrade_installer);
        assert!(!config.dependencies.skip_if_importable);
        assert_eq!(config.app.entry_point, "app.py");
        assert_eq!(config.app.host, "localhost");
        assert_eq!(config.app.port, 8501);
        assert!(config.runtime.download_url.contains("python.org"));
    }

    #[test]
    fn test_app_url() {
        assert_eq!(AppConfig::default().url(), "http://localhost:8501");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"app": {"port": 9000}}"#).unwrap();
        assert_eq!(config.app.port, 9000);
        assert_eq!(config.app.host, "localhost");
        assert_eq!(config.dependencies.packages.len(), 4);
    }

    #[test]
    fn test_log_format_deserialize() {
        let cfg: LoggingConfig = serde_json::from_str(r#"{"format":"json"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.level, "warn");
        assert!(cfg.file.is_none());
    }

    #[test]
    fn test_runtime_command_per_platform() {
        let cmd = RuntimeConfig::default().command;
        if cfg!(target_os = "windows") {
            assert_eq!(cmd, "python");
        } else {
            assert_eq!(cmd, "python3");
        }
    }
}
