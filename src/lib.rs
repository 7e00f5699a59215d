//! dashlaunch - bootstrap launcher for a local Streamlit dashboard
//!
//! Checks that Python is installed, installs the dashboard's packages with
//! pip, then runs `streamlit run app.py` bound to `localhost:8501`.

pub mod config;
pub mod console;
pub mod deps;
pub mod error;
pub mod launcher;
pub mod process;
pub mod runtime;
pub mod utils;

pub use config::Config;
pub use console::{Console, TerminalConsole};
pub use error::{LaunchError, Result};
pub use launcher::{Launcher, Stage};
pub use process::{CommandRunner, SystemRunner};
