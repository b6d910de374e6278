//! # Replication Configuration
//!
//! This module defines `ReplicationConfig`, the single value that tells the
//! pipeline where its catalogs live, where per-project artifacts go, and how
//! to reach the external tools. It is built once at startup and passed down
//! explicitly, so tests can point every path into a temporary directory.
//!
//! ## File Format
//!
//! The configuration is read from an optional YAML file. Every field has a
//! default, so an empty file (or no file at all) yields the stock layout:
//!
//! ```yaml
//! layout:
//!   projects_csv: projects.csv
//!   versions_csv: versions.csv
//!   projects_dir: projects
//!   deps_dir: deps
//!   dbs_dir: dbs
//! git:
//!   binary: git
//! extractor:
//!   java: java
//!   jar: external/depends.jar
//!   max_heap: 12G
//!   language: java
//! cochange:
//!   binary: external/cochange-tool
//!   window_years: 3
//! on_failure: skip-project
//! ```
//!
//! ## Artifact Addressing
//!
//! `Layout` owns the naming convention for every per-project artifact. All of
//! them are derived from the project name alone, so two projects never share
//! a path and a re-run for the same project overwrites its previous output.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File and directory locations for catalogs and per-project artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Project catalog (`name,url`, no header)
    pub projects_csv: PathBuf,
    /// Version catalog (`name,tag,hash,date`, no header)
    pub versions_csv: PathBuf,
    /// Root holding one working tree per project
    pub projects_dir: PathBuf,
    /// Output directory of the dependency extractor
    pub deps_dir: PathBuf,
    /// Directory holding one database per project
    pub dbs_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            projects_csv: PathBuf::from("projects.csv"),
            versions_csv: PathBuf::from("versions.csv"),
            projects_dir: PathBuf::from("projects"),
            deps_dir: PathBuf::from("deps"),
            dbs_dir: PathBuf::from("dbs"),
        }
    }
}

impl Layout {
    /// Working tree of a project.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.projects_dir.join(project)
    }

    /// Output name handed to the extractor; it appends `-structure.json`.
    pub fn dep_output_name(&self, project: &str) -> String {
        format!("{}-deps", project)
    }

    /// Dependency-structure artifact written by the extractor.
    pub fn dep_file(&self, project: &str) -> PathBuf {
        self.deps_dir
            .join(format!("{}-structure.json", self.dep_output_name(project)))
    }

    /// Per-project database shared by the dump and merge stages.
    pub fn db_file(&self, project: &str) -> PathBuf {
        self.dbs_dir.join(format!("{}.db", project))
    }
}

/// Source-control client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    pub binary: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }
}

/// Structural dependency extractor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// JVM launcher
    pub java: PathBuf,
    /// Extractor jar
    pub jar: PathBuf,
    /// Maximum heap, passed as `-Xmx<max_heap>`
    pub max_heap: String,
    /// Language mode of the analyzed projects
    pub language: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: PathBuf::from("external").join("depends.jar"),
            max_heap: "12G".to_string(),
            language: "java".to_string(),
        }
    }
}

/// Co-change tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CochangeConfig {
    pub binary: PathBuf,
    /// Length of the history window ending at the pinned version
    pub window_years: u32,
}

impl Default for CochangeConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("external").join("cochange-tool"),
            window_years: 3,
        }
    }
}

/// What the driver does when a stage fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Skip the remaining stages of the failing project, then move on.
    #[default]
    SkipProject,
    /// Stop the whole run at the first failure.
    Abort,
    /// Run every stage regardless of earlier failures.
    Continue,
}

impl FailurePolicy {
    pub const ALL: [FailurePolicy; 3] = [
        FailurePolicy::SkipProject,
        FailurePolicy::Abort,
        FailurePolicy::Continue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::SkipProject => "skip-project",
            FailurePolicy::Abort => "abort",
            FailurePolicy::Continue => "continue",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown failure policy '{}' (expected one of: skip-project, abort, continue)",
                    s
                )
            })
    }
}

/// Complete configuration of a replication run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplicationConfig {
    pub layout: Layout,
    pub git: GitConfig,
    pub extractor: ExtractorConfig,
    pub cochange: CochangeConfig,
    pub on_failure: FailurePolicy,
}

impl ReplicationConfig {
    /// Parse a configuration from YAML text and validate it.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                hint: Some(
                    "Known sections are layout, git, extractor, cochange and on_failure"
                        .to_string(),
                ),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("cannot read {}: {}", path.display(), e),
            hint: None,
        })?;
        Self::parse(&content)
    }

    /// Check values that deserialize fine but cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.cochange.window_years == 0 {
            return Err(Error::ConfigParse {
                message: "cochange.window_years must be at least 1".to_string(),
                hint: Some("The historical default is 3".to_string()),
            });
        }

        let required = [
            ("git.binary", self.git.binary.as_os_str().is_empty()),
            ("extractor.java", self.extractor.java.as_os_str().is_empty()),
            ("extractor.jar", self.extractor.jar.as_os_str().is_empty()),
            ("extractor.max_heap", self.extractor.max_heap.trim().is_empty()),
            ("extractor.language", self.extractor.language.trim().is_empty()),
            ("cochange.binary", self.cochange.binary.as_os_str().is_empty()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, empty)| *empty) {
            return Err(Error::ConfigParse {
                message: format!("{} must not be empty", field),
                hint: None,
            });
        }

        Ok(())
    }

    /// Rebase every relative path onto `root`.
    ///
    /// Program names without a directory part (`git`, `java`) keep resolving
    /// through `PATH`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let layout = &mut self.layout;
        for path in [
            &mut layout.projects_csv,
            &mut layout.versions_csv,
            &mut layout.projects_dir,
            &mut layout.deps_dir,
            &mut layout.dbs_dir,
            &mut self.extractor.jar,
        ] {
            *path = rebase(root, path);
        }
        for program in [
            &mut self.git.binary,
            &mut self.extractor.java,
            &mut self.cochange.binary,
        ] {
            if program.components().count() > 1 {
                *program = rebase(root, program);
            }
        }
        self
    }
}

fn rebase(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    root.join(relative)
}
