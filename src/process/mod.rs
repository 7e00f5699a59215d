//! Child process execution.
//!
//! Every external program the launcher touches (interpreter, pip, the
//! dashboard server) goes through a [`CommandRunner`], so the bootstrap
//! sequence can be exercised in tests without a real interpreter.

pub mod runner;

pub use runner::{
    CommandOutput, CommandRunner, CommandSpec, ForegroundChild, ForegroundExit, OutputMode,
    SystemRunner,
};

#[cfg(test)]
pub use runner::MockRunner;
