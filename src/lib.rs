//! # Co-change Replication Library
//!
//! This library rebuilds, for a fixed catalog of projects, a research
//! dataset that combines source-level structural dependencies at a pinned
//! version with co-change history mined from the commits of a trailing
//! window. It produces one database per project. The heavy lifting is done
//! by external tools; this crate loads the catalogs, prepares each project's
//! working tree, drives the tools with the right arguments in the right
//! order, and reports what happened.
//!
//! ## Quick Example
//!
//! ```
//! use cochange_replicate::config::ReplicationConfig;
//! use cochange_replicate::stages::window_start;
//! use chrono::NaiveDate;
//!
//! let config = ReplicationConfig::default();
//! assert_eq!(
//!     config.layout.db_file("bar"),
//!     std::path::PathBuf::from("dbs/bar.db")
//! );
//!
//! let pinned = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
//! let since = window_start(pinned, config.cochange.window_years).unwrap();
//! assert_eq!(since, NaiveDate::from_ymd_opt(2018, 6, 15).unwrap());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: catalog and artifact locations, tool
//!   locations, the window length and the failure policy.
//! - **Catalogs (`catalog`)**: the project and version catalogs, joined into
//!   ordered work items.
//! - **Tool invocation (`process`)**: command lines as values and the
//!   `ToolRunner` trait that executes them.
//! - **Stages (`stages`)**: checkout, extract, dump and attach.
//! - **Driver (`pipeline`)**: runs the stages per work item and collects a
//!   `RunReport`.
//!
//! ## Execution Flow
//!
//! For every work item, in catalog order:
//!
//! 1.  **Checkout**: clone the project if its tree is missing, check out the
//!     pinned tag.
//! 2.  **Extract**: run the dependency extractor on the tree.
//! 3.  **Dump**: write co-change history of the window into a fresh database.
//! 4.  **Attach**: merge the dependency file into that database, tagged with
//!     the pinned commit.

pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod stages;
