//! CLI module - command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()` and exits with the
//! code it returns.

pub mod config;
pub mod doctor;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dashlaunch::{Config, Launcher, SystemRunner, TerminalConsole};

#[derive(Parser)]
#[command(name = "dashlaunch")]
#[command(version)]
#[command(
    about = "Check Python, install the dashboard's packages, and start the dashboard",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Exit without waiting for Enter (for scripts and shortcuts)
    #[arg(long, global = true)]
    no_pause: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Python, packages, entry point and port without launching
    Doctor,
    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand, Clone, Copy)]
pub enum ConfigAction {
    /// Check configuration for errors and warnings
    Check,
}

/// Entry point for the CLI, called from main(). Returns the exit code.
pub async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // `config check` must work even when the config cannot be loaded.
    if let Some(Commands::Config { action }) = cli.command {
        config::cmd_config(action)?;
        return Ok(0);
    }

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] Failed to load {}: {}", Config::path().display(), e);
            eprintln!("Run `dashlaunch config check` for details.");
            return Ok(1);
        }
    };
    if cli.no_pause {
        config.launcher.pause = false;
    }
    dashlaunch::utils::logging::init_logging(&config.logging)?;

    match cli.command {
        None => {
            let console = Arc::new(TerminalConsole::new(config.launcher.pause));
            let mut launcher = Launcher::new(config, Arc::new(SystemRunner), console);
            Ok(launcher.run().await)
        }
        Some(Commands::Doctor) => {
            doctor::cmd_doctor(&config).await?;
            Ok(0)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(0)
        }
        Some(Commands::Config { .. }) => Ok(0),
    }
}

/// Display version information
fn cmd_version() {
    println!("dashlaunch {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Bootstrap launcher for a local Streamlit dashboard");
}
