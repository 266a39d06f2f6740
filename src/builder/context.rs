//! Build context: the resolved toolchain plus the seams every stage uses.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::executor::{CommandRunner, SearchPath, SystemRunner, ToolLocator};
use crate::builder::toolchain::ToolchainProfile;
use crate::util::Shell;

/// Everything a stage needs besides the project itself.
#[derive(Clone)]
pub struct BuildContext {
    /// Resolved toolchain, read-only for the whole run
    pub profile: Arc<ToolchainProfile>,

    /// Directory containing the workspace descriptor
    pub workspace_root: PathBuf,

    /// Executes tool invocations
    pub runner: Arc<dyn CommandRunner>,

    /// Resolves tool names to executables
    pub locator: Arc<dyn ToolLocator>,

    /// User-facing output
    pub shell: Arc<Shell>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("platform", &self.profile.platform)
            .field("arch", &self.profile.arch)
            .field("build_type", &self.profile.build_type)
            .field("workspace_root", &self.workspace_root)
            .finish()
    }
}

impl BuildContext {
    /// Context that runs real processes and searches PATH.
    pub fn new(profile: ToolchainProfile, workspace_root: &Path, shell: Arc<Shell>) -> Self {
        BuildContext {
            profile: Arc::new(profile),
            workspace_root: workspace_root.to_path_buf(),
            runner: Arc::new(SystemRunner),
            locator: Arc::new(SearchPath),
            shell,
        }
    }

    /// Replace the command runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the tool locator.
    pub fn with_locator(mut self, locator: Arc<dyn ToolLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// A path as shown to the user: relative to the workspace root when inside it.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.workspace_root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
