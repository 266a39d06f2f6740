//! Tool execution seams.
//!
//! Stages never spawn processes or search PATH themselves: they go through a
//! [`CommandRunner`] and a [`ToolLocator`], so tests can record invocations
//! without any compiler installed.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::errors::{BuildError, CommandFailure};
use crate::builder::toolchain::CommandSpec;
use crate::util::process::{find_executable, ProcessBuilder};

/// Result of one finished tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Captured stdout then stderr, line by line
    pub lines: Vec<String>,
}

impl ProcessOutput {
    pub fn success() -> Self {
        ProcessOutput {
            success: true,
            exit_code: Some(0),
            lines: Vec::new(),
        }
    }

    pub fn failure(code: i32, lines: &[&str]) -> Self {
        ProcessOutput {
            success: false,
            exit_code: Some(code),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Runs commands to completion, one at a time.
pub trait CommandRunner {
    /// Run a command and wait for it. `Err` means the process could not be
    /// started at all.
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput>;
}

/// Resolves tool names to executables.
pub trait ToolLocator {
    fn locate(&self, program: &Path) -> Option<PathBuf>;
}

/// Runs commands as real child processes, without a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput> {
        let output = ProcessBuilder::new(&cmd.program)
            .args(&cmd.args)
            .exec()?;

        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string),
        );

        Ok(ProcessOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            lines,
        })
    }
}

/// Searches PATH; names with a directory part are checked in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPath;

impl ToolLocator for SearchPath {
    fn locate(&self, program: &Path) -> Option<PathBuf> {
        find_executable(program)
    }
}

/// Resolve a tool, failing with a toolchain error naming its role.
pub fn require_tool(
    locator: &dyn ToolLocator,
    tool: &str,
    program: &Path,
) -> Result<PathBuf, BuildError> {
    locator
        .locate(program)
        .ok_or_else(|| BuildError::toolchain(tool, program))
}

/// Run a command; a non-zero exit becomes the error built by `on_failure`.
pub fn run_checked(
    runner: &dyn CommandRunner,
    cmd: &CommandSpec,
    on_failure: impl FnOnce(CommandFailure) -> BuildError,
) -> Result<(), BuildError> {
    tracing::debug!("running `{}`", cmd);

    let output = runner.run(cmd)?;
    if output.success {
        for line in &output.lines {
            tracing::info!("{}", line);
        }
        return Ok(());
    }

    Err(on_failure(CommandFailure {
        command: cmd.display(),
        exit_code: output.exit_code,
        diagnostics: output.lines,
    }))
}
