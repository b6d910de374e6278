//! # Output Configuration
//!
//! This module controls how the CLI renders its run summary: colored
//! status markers when the terminal supports them, plain text otherwise.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

use crate::pipeline::{ProjectReport, RunReport, StageOutcome};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Status marker for one stage outcome.
pub fn outcome_marker(config: &OutputConfig, outcome: &StageOutcome) -> String {
    let styled = match outcome {
        StageOutcome::Succeeded => style("ok").green(),
        StageOutcome::Failed(_) => style("FAILED").red().bold(),
        StageOutcome::Skipped => style("skipped").yellow(),
    };
    if config.use_color {
        styled.force_styling(true).to_string()
    } else {
        styled.force_styling(false).to_string()
    }
}

/// One summary line for a project, e.g. `foo: checkout ok, extract FAILED, ...`.
pub fn project_line(config: &OutputConfig, project: &ProjectReport) -> String {
    let stages: Vec<String> = project
        .stages
        .iter()
        .map(|s| format!("{} {}", s.stage, outcome_marker(config, &s.outcome)))
        .collect();
    format!("{}: {}", project.project, stages.join(", "))
}

/// Multi-line run summary, failures spelled out at the end.
pub fn render_summary(config: &OutputConfig, report: &RunReport) -> String {
    let mut lines: Vec<String> = report
        .projects
        .iter()
        .map(|p| project_line(config, p))
        .collect();

    let failed = report.failed_projects();
    lines.push(format!(
        "{} of {} projects replicated",
        report.projects.len() - failed.len(),
        report.projects.len()
    ));
    for project in failed {
        if let Some((stage, message)) = project.first_failure() {
            lines.push(format!("  {} failed at {}: {}", project.project, stage, message));
        }
    }
    lines.join("\n")
}
