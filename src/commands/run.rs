//! # Run Command Implementation
//!
//! The run command loads the catalogs and drives every selected work item
//! through checkout, extract, dump and attach. Progress is logged per stage;
//! a summary of every stage outcome is printed at the end, and the command
//! fails if any project did not replicate completely.

use anyhow::Result;
use clap::Args;

use cochange_replicate::catalog;
use cochange_replicate::config::{FailurePolicy, ReplicationConfig};
use cochange_replicate::output::{render_summary, OutputConfig};
use cochange_replicate::pipeline::Pipeline;
use cochange_replicate::process::{DryRunRunner, SystemRunner, ToolRunner};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only replicate the named project (repeatable)
    #[arg(short, long = "project", value_name = "NAME")]
    pub projects: Vec<String>,

    /// Log the tool invocations without running them or creating directories
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Years of history before the pinned version to scan for co-changes
    #[arg(long, value_name = "YEARS")]
    pub window_years: Option<u32>,

    /// What to do when a stage fails (skip-project, abort, continue)
    #[arg(long, value_name = "POLICY")]
    pub on_failure: Option<FailurePolicy>,

    /// Suppress the final summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(args: &RunArgs, mut config: ReplicationConfig) -> Result<ReplicationConfig> {
    if let Some(years) = args.window_years {
        config.cochange.window_years = years;
    }
    if let Some(policy) = args.on_failure {
        config.on_failure = policy;
    }
    config.validate()?;
    Ok(config)
}

/// Execute the run command
pub fn execute(args: &RunArgs, config: ReplicationConfig, color_flag: &str) -> Result<()> {
    let config = apply_overrides(args, config)?;
    let out = OutputConfig::from_env_and_flag(color_flag);

    let items = catalog::load_work_items(&config.layout)?;
    let items = catalog::select_projects(items, &args.projects)?;
    log::info!(
        "Replicating {} project(s), {}-year window, on failure: {}",
        items.len(),
        config.cochange.window_years,
        config.on_failure
    );

    let runner: &dyn ToolRunner = if args.dry_run {
        &DryRunRunner
    } else {
        &SystemRunner
    };
    let report = Pipeline::new(&config, runner).run(&items)?;

    if !args.quiet {
        println!("{}", render_summary(&out, &report));
    }

    let failed = report.failed_projects().len();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} projects failed to replicate",
            failed,
            report.projects.len()
        );
    }
    Ok(())
}
