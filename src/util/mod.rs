//! Utility modules for wsbuild.

pub mod config;
pub mod fs;
pub mod process;
pub mod shell;

pub use shell::{ColorChoice, Shell, Status, Verbosity};
