//! Test utilities and mocks for wsbuild unit tests.
//!
//! Stages talk to the outside world through [`CommandRunner`] and
//! [`ToolLocator`]; the mocks here stand in for both so stage and
//! orchestrator tests run without any compiler installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use wsbuild::test_support::{context_with, MockRunner, StaticLocator};
//!
//! let runner = Arc::new(MockRunner::new().fail_when("broken.c", &["error: boom"]));
//! let ctx = context_with(profile, tmp.path(), runner.clone(), StaticLocator::all());
//! // run a stage, then inspect runner.commands()
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::executor::{CommandRunner, ProcessOutput, ToolLocator};
use crate::builder::toolchain::{CommandSpec, ToolchainProfile};
use crate::core::language::Language;
use crate::core::project::{OutputKind, ProjectConfig};
use crate::util::{Shell, Verbosity};

pub use fixtures::*;

/// Records every command and pretends to be each tool.
///
/// Successful commands create the file named by their output argument, so
/// later stages and assertions see real artifacts on disk.
#[derive(Debug, Default)]
pub struct MockRunner {
    commands: Mutex<Vec<CommandSpec>>,
    failures: Vec<(String, Vec<String>)>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Fail (exit code 1, printing `lines`) any command with an argument
    /// ending in `suffix`.
    pub fn fail_when(mut self, suffix: &str, lines: &[&str]) -> Self {
        self.failures.push((
            suffix.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        ));
        self
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Programs run so far, in order.
    pub fn programs(&self) -> Vec<PathBuf> {
        self.commands().into_iter().map(|c| c.program).collect()
    }
}

/// The file a command writes, recognised from the output flags the
/// toolchain profiles use.
fn output_of(cmd: &CommandSpec) -> Option<PathBuf> {
    let args = &cmd.args;
    if args.first().map(String::as_str) == Some("rcs") {
        return args.get(1).map(PathBuf::from);
    }
    for (i, arg) in args.iter().enumerate() {
        if arg == "-o" {
            return args.get(i + 1).map(PathBuf::from);
        }
        for prefix in ["-of=", "/Fo", "/OUT:"] {
            if let Some(path) = arg.strip_prefix(prefix) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(cmd.clone());
        }

        for (suffix, lines) in &self.failures {
            if cmd.args.iter().any(|a| a.ends_with(suffix.as_str())) {
                let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
                return Ok(ProcessOutput::failure(1, &lines));
            }
        }

        if let Some(output) = output_of(cmd) {
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, b"")?;
        }
        Ok(ProcessOutput::success())
    }
}

/// Resolves a fixed set of tool names, or every name.
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    known: Option<Vec<String>>,
}

impl StaticLocator {
    /// Every tool resolves to itself.
    pub fn all() -> Self {
        StaticLocator { known: None }
    }

    /// Only the named tools resolve, matched on the full program or its
    /// file name.
    pub fn with(names: &[&str]) -> Self {
        StaticLocator {
            known: Some(names.iter().map(|n| n.to_string()).collect()),
        }
    }
}

impl ToolLocator for StaticLocator {
    fn locate(&self, program: &Path) -> Option<PathBuf> {
        let Some(known) = &self.known else {
            return Some(program.to_path_buf());
        };
        let full = program.to_string_lossy();
        let file = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        known
            .iter()
            .any(|k| *k == full || *k == file)
            .then(|| program.to_path_buf())
    }
}

/// A project rooted at `<root>/<key>` with `src`/`include` directories and
/// output in `<root>/out`.
pub fn sample_project(
    root: &Path,
    name: &str,
    kind: OutputKind,
    languages: &[Language],
) -> ProjectConfig {
    let key = name.to_lowercase();
    ProjectConfig {
        root: root.join(&key),
        name: name.to_string(),
        source_dir: PathBuf::from("src"),
        include_dir: PathBuf::from("include"),
        languages: languages.to_vec(),
        output_kind: kind,
        output_name: key.clone(),
        output_path: root.join("out"),
        depends_on: Vec::new(),
        key,
    }
}

/// A build context over mocks, with a capturing shell.
pub fn context_with(
    profile: ToolchainProfile,
    workspace_root: &Path,
    runner: Arc<MockRunner>,
    locator: StaticLocator,
) -> BuildContext {
    BuildContext::new(
        profile,
        workspace_root,
        Arc::new(Shell::capture(Verbosity::Verbose)),
    )
    .with_runner(runner)
    .with_locator(Arc::new(locator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_detection() {
        let gcc = CommandSpec::new("gcc").args(["-c", "a.c", "-o", "out/a.c.o"]);
        assert_eq!(output_of(&gcc), Some(PathBuf::from("out/a.c.o")));

        let dmd = CommandSpec::new("dmd").args(["-c", "-of=out/a.d.o", "a.d"]);
        assert_eq!(output_of(&dmd), Some(PathBuf::from("out/a.d.o")));

        let ar = CommandSpec::new("ar").args(["rcs", "libx.a", "a.o"]);
        assert_eq!(output_of(&ar), Some(PathBuf::from("libx.a")));

        let fmt = CommandSpec::new("dfmt").args(["-i", "a.d"]);
        assert_eq!(output_of(&fmt), None);
    }

    #[test]
    fn test_static_locator() {
        let locator = StaticLocator::with(&["cl.exe"]);
        assert!(locator.locate(Path::new("VC/bin/cl.exe")).is_some());
        assert!(locator.locate(Path::new("link.exe")).is_none());
        assert!(StaticLocator::all().locate(Path::new("anything")).is_some());
    }
}
