//! Checkout stage: make the project's working tree sit at the pinned tag.
//!
//! The working tree lives at `<projects_dir>/<name>` and is reused across
//! runs. It is cloned only when the directory is missing; an existing
//! directory is trusted as-is and never re-fetched. The checkout always
//! runs and discards local modifications of tracked files.

use log::{debug, info};

use super::StageContext;
use crate::catalog::{Project, Version};
use crate::config::ReplicationConfig;
use crate::error::Result;
use crate::process::{Invocation, Tool};

/// `git clone <url> <tree>`, never prompting for credentials.
pub fn clone_invocation(config: &ReplicationConfig, project: &Project) -> Invocation {
    Invocation::new(&config.git.binary)
        .arg("clone")
        .arg(project.url())
        .arg(config.layout.project_dir(project.name()))
        .env("GIT_TERMINAL_PROMPT", "0")
}

/// `git checkout <tag>` inside the tree, without the detached HEAD advice.
pub fn checkout_invocation(
    config: &ReplicationConfig,
    project: &Project,
    version: &Version,
) -> Invocation {
    Invocation::new(&config.git.binary)
        .args(["-c", "advice.detachedHead=false", "checkout"])
        .arg(version.tag())
        .current_dir(config.layout.project_dir(project.name()))
        .env("GIT_TERMINAL_PROMPT", "0")
}

/// Clone the project if needed and check out its pinned tag.
pub fn ensure_checked_out(ctx: &StageContext, project: &Project, version: &Version) -> Result<()> {
    let tree = ctx.config.layout.project_dir(project.name());

    if tree.exists() {
        debug!("{}: reusing working tree {}", project.name(), tree.display());
    } else {
        info!("Cloning {} into {}", project.url(), tree.display());
        ctx.ensure_dir(&ctx.config.layout.projects_dir)?;
        ctx.run(Tool::Git, &clone_invocation(ctx.config, project))?;
    }

    info!(
        "Switching {} to {} ({})",
        project.name(),
        version.tag(),
        version.hash()
    );
    ctx.run(Tool::Git, &checkout_invocation(ctx.config, project, version))
}
