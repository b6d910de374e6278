//! Dump stage: populate the per-project database with co-change history.
//!
//! The co-change tool scans the working tree's history from the start of
//! the window up to and including the pinned tag, and writes a fresh
//! database at `<dbs_dir>/<name>.db`. Running it again replaces the
//! previous content; that guarantee belongs to the tool.

use chrono::{Months, NaiveDate};
use log::info;

use super::StageContext;
use crate::catalog::{Project, Version, DATE_FORMAT};
use crate::config::ReplicationConfig;
use crate::error::{Error, Result};
use crate::process::{Invocation, Tool};

/// First day of a `years`-long window ending on `date`.
///
/// Keeps month and day; February 29 maps to February 28 when the target
/// year has no leap day.
pub fn window_start(date: NaiveDate, years: u32) -> Result<NaiveDate> {
    years
        .checked_mul(12)
        .and_then(|months| date.checked_sub_months(Months::new(months)))
        .ok_or(Error::Window { date, years })
}

/// `dump --db <db> --repo <tree> --since <date> <tag>`
pub fn dump_invocation(
    config: &ReplicationConfig,
    project: &Project,
    version: &Version,
    window_years: u32,
) -> Result<Invocation> {
    let since = window_start(version.date(), window_years)?;
    Ok(Invocation::new(&config.cochange.binary)
        .arg("dump")
        .arg("--db")
        .arg(config.layout.db_file(project.name()))
        .arg("--repo")
        .arg(config.layout.project_dir(project.name()))
        .arg("--since")
        .arg(since.format(DATE_FORMAT).to_string())
        .arg(version.tag()))
}

/// Create or overwrite the project's database with co-change facts.
pub fn dump_cochange(
    ctx: &StageContext,
    project: &Project,
    version: &Version,
    window_years: u32,
) -> Result<()> {
    info!("Dumping co-change info into db for {}", project.name());
    let invocation = dump_invocation(ctx.config, project, version, window_years)?;
    ctx.ensure_dir(&ctx.config.layout.dbs_dir)?;
    ctx.run(Tool::Cochange, &invocation)
}
