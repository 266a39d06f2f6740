//! High-level operations.
//!
//! This module contains the implementation of wsbuild runs.

pub mod build_workspace;

pub use build_workspace::{
    build_workspace, execute, prepare, BuildOptions, BuildSummary, RunError, RunState, Stage,
    WorkspacePlan, EXIT_BUILD, EXIT_CONFIG, EXIT_UNEXPECTED,
};
