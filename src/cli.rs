//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use cochange_replicate::config::ReplicationConfig;

use crate::commands;

/// Name of the configuration file looked up in the root directory.
const DEFAULT_CONFIG_FILE: &str = "replicate.yaml";

/// Co-change Replicate - Rebuild per-project dependency and co-change databases
#[derive(Parser, Debug)]
#[command(name = "cochange-replicate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the replication config file (defaults to replicate.yaml in the root, if present)
    #[arg(long, global = true, value_name = "FILE", env = "COCHANGE_REPLICATE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory that relative catalog, artifact and tool paths resolve against
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the replication pipeline over the catalog
    Run(commands::run::RunArgs),

    /// Show the work items and artifact paths without running anything
    Plan(commands::plan::PlanArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match &self.command {
            Commands::Completions(args) => commands::completions::execute(args),
            Commands::Run(args) => {
                let config = self.load_config()?;
                commands::run::execute(args, config, &self.color)
            }
            Commands::Plan(args) => {
                let config = self.load_config()?;
                commands::plan::execute(args, config)
            }
        }
    }

    /// Load the configuration and rebase it onto `--root`.
    fn load_config(&self) -> Result<ReplicationConfig> {
        let root = self.root.as_deref();
        let implicit = root
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_CONFIG_FILE);

        let config = match &self.config {
            Some(path) => ReplicationConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None if implicit.is_file() => ReplicationConfig::from_file(&implicit)
                .with_context(|| format!("Failed to load config from {}", implicit.display()))?,
            None => ReplicationConfig::default(),
        };

        Ok(match root {
            Some(root) => config.rooted_at(root),
            None => config,
        })
    }
}

/// Route `log` output to stderr; `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
