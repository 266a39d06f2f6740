//! wsbuild - a workspace build orchestrator for C, C++ and D
//!
//! This crate provides the library behind the `wsbuild` binary: descriptor
//! parsing, toolchain profiles, and the compile, link and lint stages.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for wsbuild unit tests.
///
/// Only available when compiling tests. Provides a recording command
/// runner, a fixed tool locator and descriptor fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildMode, ConfigError, ProjectConfig, WorkspaceConfig};
pub use ops::{build_workspace, BuildOptions, RunError};
