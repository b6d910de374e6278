//! # Pipeline Driver
//!
//! `Pipeline` runs every work item through the four stages in catalog order,
//! one item at a time and one stage at a time. There is no concurrency: each
//! external tool blocks the driver until it exits, which is also what keeps
//! the two writers of a project's database (dump, then attach) ordered.
//!
//! Each stage ends in a recorded outcome. What happens after a failure is
//! decided by the configured `FailurePolicy`:
//!
//! - `skip-project` marks the rest of the failing project's stages as
//!   skipped and moves on to the next project;
//! - `abort` stops the run with `Error::Aborted`;
//! - `continue` runs the remaining stages anyway.
//!
//! The returned `RunReport` lists the outcome of every stage of every
//! project, so callers can report partial success precisely.

use std::time::Instant;

use log::{info, warn};

use crate::catalog::WorkItem;
use crate::config::{FailurePolicy, ReplicationConfig};
use crate::error::{Error, Result};
use crate::process::ToolRunner;
use crate::stages::{self, Stage, StageContext};

/// Outcome of one stage of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Stage outcomes of one project, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    pub project: String,
    pub stages: Vec<StageReport>,
}

impl ProjectReport {
    pub fn is_success(&self) -> bool {
        self.stages
            .iter()
            .all(|s| s.outcome == StageOutcome::Succeeded)
    }

    /// The first stage that failed, if any.
    pub fn first_failure(&self) -> Option<(Stage, &str)> {
        self.stages.iter().find_map(|s| match &s.outcome {
            StageOutcome::Failed(message) => Some((s.stage, message.as_str())),
            _ => None,
        })
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| &s.outcome)
    }
}

/// Outcomes of a whole run, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub projects: Vec<ProjectReport>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.projects.iter().all(ProjectReport::is_success)
    }

    pub fn failed_projects(&self) -> Vec<&ProjectReport> {
        self.projects.iter().filter(|p| !p.is_success()).collect()
    }
}

/// Sequences the stages for a list of work items.
pub struct Pipeline<'a> {
    ctx: StageContext<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ReplicationConfig, runner: &'a dyn ToolRunner) -> Self {
        Self {
            ctx: StageContext::new(config, runner),
        }
    }

    fn policy(&self) -> FailurePolicy {
        self.ctx.config.on_failure
    }

    fn run_stage(&self, stage: Stage, item: &WorkItem) -> Result<()> {
        let ctx = &self.ctx;
        let (project, version) = (&item.project, &item.version);
        match stage {
            Stage::Checkout => stages::ensure_checked_out(ctx, project, version),
            Stage::Extract => stages::extract_dependencies(ctx, project),
            Stage::Dump => stages::dump_cochange(
                ctx,
                project,
                version,
                ctx.config.cochange.window_years,
            ),
            Stage::Attach => stages::attach_dependencies(ctx, project, version),
        }
    }

    /// Whether `stage` must not run given the stages that already failed.
    ///
    /// Attach never runs after a failed extract or dump, under any policy:
    /// the dependency file and database on disk may be left over from an
    /// earlier run and would be merged under the new commit hash.
    fn must_skip(&self, stage: Stage, failed: &[Stage]) -> bool {
        if failed.is_empty() {
            return false;
        }
        match self.policy() {
            FailurePolicy::SkipProject => true,
            _ => {
                stage == Stage::Attach
                    && failed.iter().any(|s| matches!(s, Stage::Extract | Stage::Dump))
            }
        }
    }

    /// Run the four stages for one work item.
    ///
    /// Returns `Err` only when the `abort` policy stops the run.
    pub fn run_item(&self, item: &WorkItem) -> Result<ProjectReport> {
        let name = item.project.name();
        let mut report = ProjectReport {
            project: name.to_string(),
            stages: Vec::with_capacity(Stage::ALL.len()),
        };
        let mut failed: Vec<Stage> = Vec::new();

        for stage in Stage::ALL {
            if self.must_skip(stage, &failed) {
                warn!("{}: {} skipped after earlier failure", name, stage);
                report.stages.push(StageReport {
                    stage,
                    outcome: StageOutcome::Skipped,
                });
                continue;
            }

            let outcome = match self.run_stage(stage, item) {
                Ok(()) => {
                    info!("{}: {} done", name, stage);
                    StageOutcome::Succeeded
                }
                Err(e) => {
                    warn!("{}: {} failed: {}", name, stage, e);
                    if self.policy() == FailurePolicy::Abort {
                        return Err(Error::Aborted {
                            project: name.to_string(),
                            stage: stage.to_string(),
                            message: e.to_string(),
                        });
                    }
                    failed.push(stage);
                    StageOutcome::Failed(e.to_string())
                }
            };
            report.stages.push(StageReport { stage, outcome });
        }

        Ok(report)
    }

    /// Run every work item in order.
    pub fn run(&self, items: &[WorkItem]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for (index, item) in items.iter().enumerate() {
            let started = Instant::now();
            info!(
                "[{}/{}] Replicating {} at {}",
                index + 1,
                items.len(),
                item.project.name(),
                item.version.tag()
            );
            let project_report = self.run_item(item)?;
            info!(
                "{}: finished in {:.2}s",
                item.project.name(),
                started.elapsed().as_secs_f64()
            );
            report.projects.push(project_report);
        }
        Ok(report)
    }
}
