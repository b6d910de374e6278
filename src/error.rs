//! # Error Handling
//!
//! This module defines the centralized error type for the replication
//! pipeline. It uses the `thiserror` library to build a single `Error` enum
//! covering every anticipated failure mode, each variant carrying enough
//! context (file, line, project, tool, command line) to act on the message
//! without re-running the pipeline.
//!
//! The failure modes fall into four groups:
//!
//! - Configuration errors: an unreadable or invalid `replicate.yaml`.
//! - Catalog errors: unreadable catalogs, malformed rows, empty fields,
//!   malformed dates, and projects without a version entry. These are fatal
//!   and surface before any stage runs.
//! - Tool errors: an external tool that could not be spawned or that exited
//!   with a non-zero status.
//! - Artifact errors: a stage input that an earlier stage should have
//!   produced but that is not on disk.
//!
//! The `Result` alias is used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

use crate::process::Tool;

/// Main error type for replication operations
#[derive(Error, Debug)]
pub enum Error {
    /// The replication configuration could not be parsed or is invalid.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A catalog file could not be opened or read.
    #[error("Cannot read catalog {}: {message}", path.display())]
    CatalogRead { path: PathBuf, message: String },

    /// A catalog row does not have the expected shape.
    #[error("Malformed record in {} at line {line}: {message}", path.display())]
    CatalogRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// A required field of a project or version is empty.
    #[error("Invalid {entity}: field `{field}` must not be empty")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
    },

    /// A version date is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date {value:?} for project {project}: {message}")]
    InvalidDate {
        project: String,
        value: String,
        message: String,
    },

    /// A project listed in the project catalog has no version entry.
    #[error("No version entry for project {project}")]
    MissingVersion { project: String },

    /// A project was requested by name but is not in the catalog.
    #[error("Unknown project {project}")]
    UnknownProject { project: String },

    /// The history window start could not be computed.
    #[error("Cannot compute a {years}-year window before {date}")]
    Window { date: chrono::NaiveDate, years: u32 },

    /// An external tool could not be started at all.
    #[error("Failed to start {tool} ({command}): {message}")]
    ToolSpawn {
        tool: Tool,
        command: String,
        message: String,
    },

    /// An external tool ran but reported failure through its exit status.
    #[error("{tool} exited with {}: {command}{}", status.map(|c| format!("status {}", c)).unwrap_or_else(|| "a signal".to_string()), if stderr.is_empty() { String::new() } else { format!("\n{}", stderr) })]
    ToolFailed {
        tool: Tool,
        command: String,
        status: Option<i32>,
        /// Tail of the captured standard error
        stderr: String,
    },

    /// A stage input produced by an earlier stage is missing.
    #[error("Missing {artifact} for project {project}: {} does not exist", path.display())]
    MissingArtifact {
        project: String,
        artifact: &'static str,
        path: PathBuf,
    },

    /// The run was stopped by the `abort` failure policy.
    #[error("Run aborted: stage {stage} failed for project {project}: {message}")]
    Aborted {
        project: String,
        stage: String,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV error, wrapped from `csv::Error`.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
