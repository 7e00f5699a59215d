//! Logging initialization for dashlaunch.
//!
//! Supports three formats:
//! - `pretty`: compact human-readable text
//! - `component`: compact text plus a `component` field per event; use the
//!   [`log_component!`] macro to tag events with the launcher stage
//! - `json`: structured JSON lines
//!
//! Logs go to stderr (or a file). User-facing status lines are printed by the
//! launcher console, not through tracing.

use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::Result;

/// Initialize the global tracing subscriber from config.
///
/// Call this once at startup before any tracing events are emitted.
/// `RUST_LOG` wins over `cfg.level`. A second call is a no-op.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let file = match &cfg.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    // try_init: tests and repeated calls must not panic on an existing subscriber.
    let _ = match (cfg.format, file) {
        (LogFormat::Json, Some(file)) => builder.json().with_writer(Mutex::new(file)).try_init(),
        (LogFormat::Json, None) => builder
            .json()
            .with_writer(std::io::stderr)
            .try_init(),
        (_, Some(file)) => builder
            .compact()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        (_, None) => builder.compact().with_writer(std::io::stderr).try_init(),
    };

    Ok(())
}

/// Emit a component-tagged tracing event.
///
/// ```
/// # use dashlaunch::log_component;
/// log_component!(info, "installer", "installing packages");
/// log_component!(warn, "launcher", "port busy", port = 8501u16);
/// ```
#[macro_export]
macro_rules! log_component {
    ($level:ident, $component:expr, $msg:expr) => {
        tracing::$level!(component = $component, $msg)
    };
    ($level:ident, $component:expr, $msg:expr, $($key:ident = $val:expr),+ $(,)?) => {
        tracing::$level!(component = $component, $($key = $val,)+ $msg)
    };
}
