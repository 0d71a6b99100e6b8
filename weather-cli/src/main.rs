//! Binary crate for the `weather-feed` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Reading the template from stdin
//! - Logging setup and exit codes

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
