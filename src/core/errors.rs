//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::ini::BadLine;

/// A workspace or project descriptor could not be turned into configuration.
///
/// Always raised before any external tool runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{}` is inaccessible", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read `{}`", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing `{}` failed due to malformed syntax: {}", path.display(), join_lines(lines))]
    Malformed { path: PathBuf, lines: Vec<BadLine> },

    #[error("`{}` is missing `{key}` in section [{section}]", path.display())]
    MissingKey {
        path: PathBuf,
        section: String,
        key: String,
    },

    #[error("`{}` has a non-numeric schema version `{value}`", path.display())]
    InvalidVersion { path: PathBuf, value: String },

    #[error("schema version {version} of `{}` is not supported (latest is {latest})", path.display())]
    UnsupportedSchema {
        path: PathBuf,
        version: u32,
        latest: u32,
    },

    #[error("invalid output type `{value}` in `{}`; expected executable, shared or static", path.display())]
    InvalidOutputKind { path: PathBuf, value: String },

    #[error("unknown language `{value}` in `{}`; expected c, c++ or d", path.display())]
    UnknownLanguage { path: PathBuf, value: String },

    #[error("`{}` declares no source languages", path.display())]
    NoLanguages { path: PathBuf },

    #[error("workspace `{}` declares no projects", path.display())]
    EmptyOrder { path: PathBuf },

    #[error("project `{key}` is listed in the build order but has no entry in [projects]")]
    UnknownProject { key: String },

    #[error("project `{key}` is listed more than once in the build order")]
    DuplicateProject { key: String },

    #[error("invalid build type `{0}`; expected debug, release (optionally suffixed 32 or 64) or lint")]
    InvalidMode(String),

    #[error("project `{project}` depends on `{dependency}`, which is built after it")]
    DependencyOrder { project: String, dependency: String },
}

fn join_lines(lines: &[BadLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
