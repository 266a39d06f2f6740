//! Errors raised by the build stages.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A tool invocation that ran and exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// Display form of the exact argument vector
    pub command: String,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Captured stdout then stderr, line by line
    pub diagnostics: Vec<String>,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "exit code {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    /// A compiler, linker, archiver or formatter could not be resolved.
    #[error("{tool} `{program}` not found")]
    Toolchain { tool: String, program: PathBuf },

    #[error("unsupported platform `{0}`: only Windows and POSIX hosts are supported")]
    UnsupportedPlatform(String),

    #[error("failed to compile {} ({failure})", file.display())]
    Compile {
        file: PathBuf,
        failure: CommandFailure,
    },

    #[error("failed to link {} ({failure})", artifact.display())]
    Link {
        artifact: PathBuf,
        failure: CommandFailure,
    },

    #[error("failed to format {} ({failure})", file.display())]
    Lint {
        file: PathBuf,
        failure: CommandFailure,
    },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl BuildError {
    pub fn toolchain(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        BuildError::Toolchain {
            tool: tool.into(),
            program: program.into(),
        }
    }

    /// The failed invocation, for errors raised by a tool run.
    pub fn failure(&self) -> Option<&CommandFailure> {
        match self {
            BuildError::Compile { failure, .. }
            | BuildError::Link { failure, .. }
            | BuildError::Lint { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
