//! Configuration management for dashlaunch
//!
//! Configuration is read from `~/.dashlaunch/config.json` when present, with
//! environment variable overrides. The launcher never writes this file; with
//! no file and no overrides the defaults reproduce the built-in sequence.

mod types;
pub mod validate;

pub use types::*;

use crate::error::{LaunchError, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Returns the dashlaunch configuration directory path (~/.dashlaunch)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dashlaunch")
    }

    /// Returns the path to the config file (~/.dashlaunch/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// Environment variables follow the pattern `DASHLAUNCH_SECTION_KEY`.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                Config::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.check()?;

        Ok(config)
    }

    /// Apply overrides from the process environment.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve `DASHLAUNCH_*` variables.
    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Runtime
        if let Some(val) = lookup("DASHLAUNCH_RUNTIME_COMMAND") {
            self.runtime.command = val;
        }

        // Dependencies
        if let Some(val) = lookup("DASHLAUNCH_DEPENDENCIES_PACKAGES") {
            self.dependencies.packages = val
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
        if let Some(val) = lookup("DASHLAUNCH_DEPENDENCIES_SKIP_IF_IMPORTABLE") {
            if let Ok(v) = val.parse() {
                self.dependencies.skip_if_importable = v;
            }
        }

        // App
        if let Some(val) = lookup("DASHLAUNCH_APP_ENTRY_POINT") {
            self.app.entry_point = val;
        }
        if let Some(val) = lookup("DASHLAUNCH_APP_HOST") {
            self.app.host = val;
        }
        if let Some(val) = lookup("DASHLAUNCH_APP_PORT") {
            if let Ok(v) = val.parse() {
                self.app.port = v;
            }
        }
        if let Some(val) = lookup("DASHLAUNCH_APP_WORKING_DIR") {
            self.app.working_dir = Some(val);
        }
        if let Some(val) = lookup("DASHLAUNCH_APP_CHECK_PORT") {
            if let Ok(v) = val.parse() {
                self.app.check_port = v;
            }
        }

        // Launcher
        if let Some(val) = lookup("DASHLAUNCH_LAUNCHER_PAUSE") {
            if let Ok(v) = val.parse() {
                self.launcher.pause = v;
            }
        }

        // Logging
        if let Some(val) = lookup("DASHLAUNCH_LOGGING_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Reject values the launcher cannot run with.
    pub fn check(&self) -> Result<()> {
        if self.runtime.command.trim().is_empty() {
            return Err(LaunchError::Config(
                "runtime.command must not be empty".into(),
            ));
        }
        if self.app.entry_point.trim().is_empty() {
            return Err(LaunchError::Config(
                "app.entry_point must not be empty".into(),
            ));
        }
        if self.app.port == 0 {
            return Err(LaunchError::Config("app.port must be non-zero".into()));
        }
        if self.dependencies.packages.iter().any(|p| p.trim().is_empty()) {
            return Err(LaunchError::Config(
                "dependencies.packages must not contain empty names".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.app.port, 8501);
        assert_eq!(config.app.entry_point, "app.py");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"app": {"entry_point": "dashboard.py", "port": 8600}}"#,
        )
        .unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.app.entry_point, "dashboard.py");
        assert_eq!(config.app.port, 8600);
        assert_eq!(config.app.host, "localhost");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "  \n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.dependencies.packages.len(), 4);
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let result = Config::load_from_path(&path);
        assert!(matches!(result, Err(LaunchError::Json(_))));
    }

    #[test]
    fn test_load_rejects_zero_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"app": {"port": 0}}"#).unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("app.port"));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("DASHLAUNCH_RUNTIME_COMMAND", "py"),
            ("DASHLAUNCH_APP_PORT", "9001"),
            ("DASHLAUNCH_APP_WORKING_DIR", "/srv/dash"),
            ("DASHLAUNCH_DEPENDENCIES_PACKAGES", "streamlit, numpy ,,"),
            ("DASHLAUNCH_LAUNCHER_PAUSE", "false"),
        ]));
        assert_eq!(config.runtime.command, "py");
        assert_eq!(config.app.port, 9001);
        assert_eq!(config.app.working_dir.as_deref(), Some("/srv/dash"));
        assert_eq!(config.dependencies.packages, vec!["streamlit", "numpy"]);
        assert!(!config.launcher.pause);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("DASHLAUNCH_APP_PORT", "eighty"),
            ("DASHLAUNCH_LAUNCHER_PAUSE", "maybe"),
        ]));
        assert_eq!(config.app.port, 8501);
        assert!(config.launcher.pause);
    }

    #[test]
    fn test_check_rejects_empty_package_name() {
        let mut config = Config::default();
        config.dependencies.packages.push("  ".into());
        assert!(config.check().is_err());
    }

    #[test]
    fn test_check_accepts_defaults() {
        assert!(Config::default().check().is_ok());
    }

    #[test]
    fn test_path_under_config_dir() {
        let path = Config::path();
        assert!(path.ends_with(".dashlaunch/config.json"));
    }
}
