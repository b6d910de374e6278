//! # Co-change Replicate CLI
//!
//! This is the binary entry point for the `cochange-replicate` command-line
//! tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initializing logging and loading the replication configuration.
//! - Executing the selected command and turning errors into a non-zero exit.
//!
//! The pipeline itself lives in the library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
