//! # External Tool Invocation
//!
//! Every stage of the pipeline boils down to running an external program:
//! the `git` client, the dependency extractor on the JVM, or the co-change
//! tool. This module gives those runs a common shape.
//!
//! - **`Invocation`** describes one command line: program, arguments,
//!   optional working directory and extra environment.
//! - **`ToolRunner`** executes an invocation and returns a `ToolOutput` with
//!   the exit status and captured output. Stages never look at stdout or
//!   stderr for meaning; the exit status is the only success signal.
//! - **`SystemRunner`** is the real implementation on top of
//!   `std::process::Command`. **`DryRunRunner`** only logs what would run.
//!
//! Keeping the runner behind a trait lets tests record the exact call
//! sequence without spawning anything.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};

/// Number of stderr lines kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// The external tools the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Git,
    Extractor,
    Cochange,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Git => "git",
            Tool::Extractor => "dependency extractor",
            Tool::Cochange => "co-change tool",
        };
        f.write_str(name)
    }
}

/// A single command line to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: PathBuf::from(program.as_ref()),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Arguments as lossy strings, mostly for assertions and logs.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Program and arguments as one line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.arg_strings())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())?;
        if let Some(cwd) = &self.cwd {
            write!(f, " (in {})", cwd.display())?;
        }
        Ok(())
    }
}

/// What a finished tool run reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn succeeded() -> Self {
        Self {
            status: Some(0),
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Turn a non-success into `Error::ToolFailed`.
    pub fn check(self, tool: Tool, invocation: &Invocation) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        Err(Error::ToolFailed {
            tool,
            command: invocation.command_line(),
            status: self.status,
            stderr: stderr_tail(&self.stderr),
        })
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Runs external tools - allows recording in tests
pub trait ToolRunner {
    /// Run `invocation` to completion.
    ///
    /// Returns `Err` only when the process could not be started; a process
    /// that ran and failed is an `Ok` with `success == false`.
    fn run(&self, tool: Tool, invocation: &Invocation) -> Result<ToolOutput>;

    /// Whether this runner skips real execution.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs tools as child processes of this one.
///
/// Standard input is closed so that a tool asking for credentials fails
/// instead of waiting forever.
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, tool: Tool, invocation: &Invocation) -> Result<ToolOutput> {
        debug!("Running {}", invocation);

        // A relative program path with a directory part would otherwise be
        // looked up from the child's working directory on some platforms.
        let program = if invocation.program.is_relative()
            && invocation.program.components().count() > 1
        {
            std::path::absolute(&invocation.program)?
        } else {
            invocation.program.clone()
        };

        let mut command = Command::new(&program);
        command.args(&invocation.args).stdin(Stdio::null());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        let output = command.output().map_err(|e| Error::ToolSpawn {
            tool,
            command: invocation.command_line(),
            message: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stdout.trim().is_empty() {
            debug!("{} stdout:\n{}", tool, stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr:\n{}", tool, stderr.trim_end());
        }

        Ok(ToolOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

/// Logs each invocation and reports success without running anything.
pub struct DryRunRunner;

impl ToolRunner for DryRunRunner {
    fn run(&self, _tool: Tool, invocation: &Invocation) -> Result<ToolOutput> {
        info!("[dry-run] {}", invocation);
        Ok(ToolOutput::succeeded())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
