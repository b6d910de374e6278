//! # Plan Command Implementation
//!
//! Loads and joins the catalogs, then prints one block per work item: the
//! pinned version, the start of its history window, and the paths of its
//! working tree, dependency file and database. Nothing is cloned, run or
//! written, which makes this the quickest way to check a new catalog.

use anyhow::Result;
use clap::Args;

use cochange_replicate::catalog::{self, WorkItem, DATE_FORMAT};
use cochange_replicate::config::ReplicationConfig;
use cochange_replicate::stages::window_start;

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Only show the named project (repeatable)
    #[arg(short, long = "project", value_name = "NAME")]
    pub projects: Vec<String>,

    /// Years of history before the pinned version to scan for co-changes
    #[arg(long, value_name = "YEARS")]
    pub window_years: Option<u32>,
}

fn describe(config: &ReplicationConfig, item: &WorkItem, window_years: u32) -> Result<String> {
    let layout = &config.layout;
    let name = item.project.name();
    let since = window_start(item.version.date(), window_years)?;
    Ok(format!(
        "{name}\n  url:      {}\n  version:  {} ({}, {})\n  window:   {} .. {}\n  tree:     {}\n  deps:     {}\n  database: {}",
        item.project.url(),
        item.version.tag(),
        item.version.hash(),
        item.version.date().format(DATE_FORMAT),
        since.format(DATE_FORMAT),
        item.version.tag(),
        layout.project_dir(name).display(),
        layout.dep_file(name).display(),
        layout.db_file(name).display(),
    ))
}

/// Execute the plan command
pub fn execute(args: &PlanArgs, config: ReplicationConfig) -> Result<()> {
    let window_years = args.window_years.unwrap_or(config.cochange.window_years);
    if window_years == 0 {
        anyhow::bail!("--window-years must be at least 1");
    }

    let items = catalog::load_work_items(&config.layout)?;
    let items = catalog::select_projects(items, &args.projects)?;

    for item in &items {
        println!("{}", describe(&config, item, window_years)?);
    }
    println!("{} work item(s)", items.len());
    Ok(())
}
