//! Attach stage: merge the dependency file into the project's database.
//!
//! This is the second writer of the per-project database and must follow
//! the dump stage for the same project. Both inputs are checked on disk
//! first, so a missing database or dependency file is reported as such
//! instead of as an opaque tool failure.

use std::path::Path;

use log::info;

use super::StageContext;
use crate::catalog::{Project, Version};
use crate::config::ReplicationConfig;
use crate::error::{Error, Result};
use crate::process::{Invocation, Tool};

/// `add-deps --db <db> --commit <hash> --dep-file <file>`
pub fn add_deps_invocation(
    config: &ReplicationConfig,
    project: &Project,
    version: &Version,
) -> Invocation {
    Invocation::new(&config.cochange.binary)
        .arg("add-deps")
        .arg("--db")
        .arg(config.layout.db_file(project.name()))
        .arg("--commit")
        .arg(version.hash())
        .arg("--dep-file")
        .arg(config.layout.dep_file(project.name()))
}

fn require_artifact(project: &Project, artifact: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(Error::MissingArtifact {
        project: project.name().to_string(),
        artifact,
        path: path.to_path_buf(),
    })
}

/// Attach the extracted dependencies to the database, tagged with the
/// pinned commit hash.
pub fn attach_dependencies(ctx: &StageContext, project: &Project, version: &Version) -> Result<()> {
    info!("Adding deps to the db of {}", project.name());
    let layout = &ctx.config.layout;
    if !ctx.dry_run() {
        require_artifact(project, "database", &layout.db_file(project.name()))?;
        require_artifact(project, "dependency file", &layout.dep_file(project.name()))?;
    }
    ctx.run(Tool::Cochange, &add_deps_invocation(ctx.config, project, version))
}
