//! # Pipeline Stages
//!
//! Each work item passes through four stages, always in this order:
//!
//! 1. **Checkout** (`repository`): clone the project if its working tree is
//!    missing, then check out the pinned tag.
//! 2. **Extract** (`extract`): run the structural dependency extractor on
//!    the working tree.
//! 3. **Dump** (`cochange`): populate a fresh per-project database with the
//!    co-change history of the window ending at the tag.
//! 4. **Attach** (`merge`): merge the extracted dependency file into that
//!    database, tagged with the pinned commit.
//!
//! Every stage communicates with the next only through files addressed by
//! the project name. Stages build their command lines as plain
//! `Invocation` values, which keeps the exact arguments testable without
//! running anything.

pub mod cochange;
pub mod extract;
pub mod merge;
pub mod repository;

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::ReplicationConfig;
use crate::error::Result;
use crate::process::{Invocation, Tool, ToolRunner};

pub use cochange::{dump_cochange, window_start};
pub use extract::extract_dependencies;
pub use merge::attach_dependencies;
pub use repository::ensure_checked_out;

/// The stages of one work item, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Checkout,
    Extract,
    Dump,
    Attach,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Checkout, Stage::Extract, Stage::Dump, Stage::Attach];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Checkout => "checkout",
            Stage::Extract => "extract",
            Stage::Dump => "dump",
            Stage::Attach => "attach",
        };
        f.write_str(name)
    }
}

/// What every stage needs: the configuration and a way to run tools.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub config: &'a ReplicationConfig,
    pub runner: &'a dyn ToolRunner,
}

impl<'a> StageContext<'a> {
    pub fn new(config: &'a ReplicationConfig, runner: &'a dyn ToolRunner) -> Self {
        Self { config, runner }
    }

    /// True when tools are only logged, not executed.
    pub fn dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }

    /// Run a tool and treat a non-zero exit as an error.
    pub fn run(&self, tool: Tool, invocation: &Invocation) -> Result<()> {
        self.runner.run(tool, invocation)?.check(tool, invocation)?;
        Ok(())
    }

    /// Create a directory and its parents, unless this is a dry run.
    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !self.dry_run() && !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
