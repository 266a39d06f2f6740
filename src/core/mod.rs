//! Core data structures for wsbuild.
//!
//! This module contains the configuration model the build engine consumes:
//! - The descriptor parser (INI dialect)
//! - Workspace and project descriptors
//! - Languages and build-type tokens

pub mod errors;
pub mod ini;
pub mod language;
pub mod mode;
pub mod project;
pub mod workspace;

pub use errors::ConfigError;
pub use ini::IniDocument;
pub use language::Language;
pub use mode::{Arch, BuildMode, BuildType};
pub use project::{OutputKind, ProjectConfig};
pub use workspace::{ProjectRef, WorkspaceConfig, SCHEMA_VERSION};
