//! Error types for dashlaunch
//!
//! Every failure the launcher can hit is a variant of [`LaunchError`].
//! Uses `thiserror` for `Display` and `Error` implementations.

use thiserror::Error;

/// Render an optional process exit code for diagnostics.
///
/// `None` means the process was terminated by a signal.
pub fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for launcher operations.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The runtime's version query could not be run or exited non-zero.
    #[error("Runtime missing: '{command}' is not installed or not on PATH")]
    RuntimeMissing { command: String },

    /// `pip install` for the declared packages exited non-zero.
    #[error(
        "Dependency installation failed ({}) for: {}",
        describe_exit(.code),
        .packages.join(", ")
    )]
    DependencyInstallFailed {
        packages: Vec<String>,
        code: Option<i32>,
    },

    /// A child process could not be spawned at all.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration-related errors (invalid values, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LaunchError {
    /// Process exit status the launcher terminates with for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// A specialized `Result` type for launcher operations.
pub type Result<T> = std::result::Result<T, LaunchError>;
