//! # Project and Version Catalogs
//!
//! The pipeline is driven by two comma-separated files without headers:
//!
//! - the project catalog, one `name,url` row per project;
//! - the version catalog, one `name,tag,hash,date` row per project, where
//!   `date` is a `YYYY-MM-DD` calendar date.
//!
//! `load_work_items` joins them on the project name. The result follows the
//! project catalog's row order and contains exactly one `WorkItem` per row.
//! Any malformed row or date, and any project without a version entry, fails
//! the whole load: later stages need both halves of every item, so a partial
//! list is never returned.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use log::debug;

use crate::config::Layout;
use crate::error::{Error, Result};

/// Date format of the version catalog.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A project to replicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    url: String,
}

impl Project {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let url = url.into();
        require("project", "name", &name)?;
        require("project", "url", &url)?;
        Ok(Self { name, url })
    }

    /// Key for every derived artifact path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The pinned version of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    tag: String,
    hash: String,
    date: NaiveDate,
}

impl Version {
    pub fn new(tag: impl Into<String>, hash: impl Into<String>, date: NaiveDate) -> Result<Self> {
        let tag = tag.into();
        let hash = hash.into();
        require("version", "tag", &tag)?;
        require("version", "hash", &hash)?;
        Ok(Self { tag, hash, date })
    }

    /// Ref checked out into the working tree.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Commit the dependency facts are attached to.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Anchor of the history window.
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// One unit of pipeline work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub project: Project,
    pub version: Version,
}

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidField { entity, field });
    }
    Ok(())
}

/// Parse a catalog date.
pub fn parse_date(project: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| Error::InvalidDate {
        project: project.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Read every row of a headerless CSV file, checking the column count.
fn read_rows(path: &Path, columns: usize) -> Result<Vec<(u64, csv::StringRecord)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::CatalogRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() != columns {
            return Err(Error::CatalogRecord {
                path: path.to_path_buf(),
                line,
                message: format!("expected {} fields, found {}", columns, record.len()),
            });
        }
        rows.push((line, record));
    }
    Ok(rows)
}

/// Wrap a field-level error with the row it came from.
fn at_row(path: &Path, line: u64, error: Error) -> Error {
    match error {
        Error::InvalidField { .. } => Error::CatalogRecord {
            path: path.to_path_buf(),
            line,
            message: error.to_string(),
        },
        other => other,
    }
}

/// Load the project catalog in row order.
pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    read_rows(path, 2)?
        .into_iter()
        .map(|(line, row)| Project::new(&row[0], &row[1]).map_err(|e| at_row(path, line, e)))
        .collect()
}

/// Load the version catalog keyed by project name.
///
/// A project listed twice keeps its last entry.
pub fn load_versions(path: &Path) -> Result<HashMap<String, Version>> {
    let mut versions = HashMap::new();
    for (line, row) in read_rows(path, 4)? {
        require("version", "name", &row[0]).map_err(|e| at_row(path, line, e))?;
        let name = row[0].to_string();
        let date = parse_date(&name, &row[3])?;
        let version = Version::new(&row[1], &row[2], date).map_err(|e| at_row(path, line, e))?;
        if versions.insert(name.clone(), version).is_some() {
            debug!("{}: duplicate version entry for {}, keeping the last", path.display(), name);
        }
    }
    Ok(versions)
}

/// Join the two catalogs into work items, in project catalog order.
pub fn join(projects: Vec<Project>, versions: &HashMap<String, Version>) -> Result<Vec<WorkItem>> {
    projects
        .into_iter()
        .map(|project| {
            let version = versions
                .get(project.name())
                .cloned()
                .ok_or_else(|| Error::MissingVersion {
                    project: project.name().to_string(),
                })?;
            Ok(WorkItem { project, version })
        })
        .collect()
}

/// Load both catalogs named by `layout` and join them.
pub fn load_work_items(layout: &Layout) -> Result<Vec<WorkItem>> {
    let versions = load_versions(&layout.versions_csv)?;
    let projects = load_projects(&layout.projects_csv)?;
    let items = join(projects, &versions)?;
    debug!("Loaded {} work items", items.len());
    Ok(items)
}

/// Keep only the named projects, preserving catalog order.
///
/// An empty `names` keeps everything; a name absent from the catalog is an
/// error.
pub fn select_projects(items: Vec<WorkItem>, names: &[String]) -> Result<Vec<WorkItem>> {
    if names.is_empty() {
        return Ok(items);
    }
    if let Some(unknown) = names
        .iter()
        .find(|name| !items.iter().any(|item| item.project.name() == name.as_str()))
    {
        return Err(Error::UnknownProject {
            project: unknown.clone(),
        });
    }
    Ok(items
        .into_iter()
        .filter(|item| names.iter().any(|name| name == item.project.name()))
        .collect())
}
