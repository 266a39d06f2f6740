//! Toolchain override files.
//!
//! wsbuild reads two optional locations:
//! - Global: `~/.wsbuild/toolchain.toml` - User-wide defaults
//! - Workspace: `<workspace root>/.wsbuild/toolchain.toml` - Workspace overrides
//!
//! Workspace config takes precedence over global config. A file that fails
//! to parse is reported and ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contents of a `toolchain.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Compiler and linker overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// C++ compiler (e.g., /usr/bin/clang++)
    pub cxx: Option<PathBuf>,

    /// D compiler (e.g., ldmd2)
    pub dc: Option<PathBuf>,

    /// Linker for executables and shared libraries
    pub linker: Option<PathBuf>,

    /// Archiver for static libraries
    pub archiver: Option<PathBuf>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional C++ compiler flags
    pub cxxflags: Vec<String>,

    /// Additional D compiler flags
    pub dflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl ToolchainSettings {
    /// Fill compilers left unset from the CC, CXX and DC environment variables.
    pub fn with_env_fallback(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| var(name).filter(|v| !v.is_empty()).map(PathBuf::from);

        if self.cc.is_none() {
            self.cc = lookup("CC");
        }
        if self.cxx.is_none() {
            self.cxx = lookup("CXX");
        }
        if self.dc.is_none() {
            self.dc = lookup("DC");
        }
        self
    }
}

impl ToolchainConfig {
    /// Load toolchain configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load toolchain configuration with fallback to defaults if the file
    /// doesn't exist or is invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("ignoring toolchain config {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainConfig) {
        let ours = &mut self.toolchain;
        let theirs = other.toolchain;

        if theirs.cc.is_some() {
            ours.cc = theirs.cc;
        }
        if theirs.cxx.is_some() {
            ours.cxx = theirs.cxx;
        }
        if theirs.dc.is_some() {
            ours.dc = theirs.dc;
        }
        if theirs.linker.is_some() {
            ours.linker = theirs.linker;
        }
        if theirs.archiver.is_some() {
            ours.archiver = theirs.archiver;
        }
        if !theirs.cflags.is_empty() {
            ours.cflags = theirs.cflags;
        }
        if !theirs.cxxflags.is_empty() {
            ours.cxxflags = theirs.cxxflags;
        }
        if !theirs.dflags.is_empty() {
            ours.dflags = theirs.dflags;
        }
        if !theirs.ldflags.is_empty() {
            ours.ldflags = theirs.ldflags;
        }
    }
}

/// Load merged toolchain configuration from global and workspace locations.
///
/// Order of precedence (highest to lowest):
/// 1. Workspace config (.wsbuild/toolchain.toml)
/// 2. Global config (~/.wsbuild/toolchain.toml)
/// 3. Defaults
pub fn load_toolchain_config(global_path: Option<&Path>, workspace_path: &Path) -> ToolchainConfig {
    let mut config = ToolchainConfig::default();

    if let Some(global) = global_path {
        config.merge(ToolchainConfig::load_or_default(global));
    }
    config.merge(ToolchainConfig::load_or_default(workspace_path));

    config
}

/// Get the global wsbuild config directory (~/.wsbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".wsbuild"))
}

/// Get the global toolchain config path (~/.wsbuild/toolchain.toml).
pub fn global_toolchain_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("toolchain.toml"))
}

/// Get the workspace toolchain config path (.wsbuild/toolchain.toml).
pub fn workspace_toolchain_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".wsbuild").join("toolchain.toml")
}
