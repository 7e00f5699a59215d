//! dashlaunch CLI - bootstrap launcher for a local dashboard
//!
//! All CLI logic lives in the `cli` module. This file is just the entry point.

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = cli::run().await?;
    std::process::exit(code)
}
