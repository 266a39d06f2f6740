//! C, C++ and D build stages.
//!
//! Each stage turns a project plus the resolved toolchain profile into tool
//! invocations, run one at a time through the context's command runner.

pub mod compile;
pub mod context;
pub mod discovery;
pub mod errors;
pub mod executor;
pub mod link;
pub mod lint;
pub mod toolchain;

pub use context::BuildContext;
pub use errors::{BuildError, CommandFailure};
pub use executor::{CommandRunner, ProcessOutput, SearchPath, SystemRunner, ToolLocator};
pub use toolchain::{resolve_profile, CommandSpec, PlatformFamily, ToolchainProfile};
