//! Running build and clean tools as child processes.
//!
//! The [`ToolRunner`] trait is the seam between the audit logic and real
//! process spawning. Tests substitute scripted runners that mimic a build
//! tool's filesystem effects without forking anything.

use std::fmt;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// How one tool invocation exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Success,
    /// Non-zero exit. `code` is `None` when the child died to a signal.
    Failed { code: Option<i32> },
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        matches!(self, ToolStatus::Success)
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Success => write!(f, "exit status 0"),
            ToolStatus::Failed { code: Some(code) } => write!(f, "exit status {code}"),
            ToolStatus::Failed { code: None } => write!(f, "terminated by signal"),
        }
    }
}

/// Synchronous tool invocation.
///
/// `argv` must be non-empty and its first element is the program to run.
/// Implementations run the command to completion with the child's stdin,
/// stdout and stderr discarded, and report how it exited; failing to start
/// the program at all is `Err`. At most one child is outstanding at a time,
/// and there is deliberately no timeout: a hung tool hangs the audit.
pub trait ToolRunner {
    fn run(&self, argv: &[String]) -> Result<ToolStatus>;
}

/// Runner that spawns real processes.
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<ToolStatus> {
        let (program, args) = argv.split_first().ok_or_else(|| anyhow!("empty command"))?;

        // Report lines buffered on our stdout must land before the child's
        // output would have (the child's is discarded, but ordering against
        // the user's terminal still matters when stdout is a pipe).
        io::stdout().flush().context("flush stdout")?;

        debug!(command = %render_argv(argv), "spawning tool");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("run '{program}'"))?;

        let status = if status.success() {
            ToolStatus::Success
        } else {
            ToolStatus::Failed {
                code: status.code(),
            }
        };
        debug!(command = %render_argv(argv), %status, "tool finished");
        Ok(status)
    }
}

/// Render an argument vector for diagnostics.
pub fn render_argv(argv: &[String]) -> String {
    argv.join(" ")
}
