//! Host probing and profile resolution.
//!
//! Probing never fails the run: a missing Visual Studio, SDK or D install
//! falls back to default paths with a warning, and the missing tool is only
//! reported once a stage actually needs it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::builder::errors::BuildError;
use crate::core::mode::{Arch, BuildMode};
use crate::util::config::{
    global_toolchain_config_path, load_toolchain_config, workspace_toolchain_config_path,
};
use crate::util::process::{find_executable, ProcessBuilder};

use super::{PlatformFamily, ToolchainProfile};

/// Visual Studio editions, most capable first.
const VS_EDITIONS: &[&str] = &["Enterprise", "Professional", "Community"];

/// Windows 10 SDK version the include and library layout is taken from.
pub const WINDOWS_SDK_VERSION: &str = "10.0.10586.0";

const D_INSTALL_DIRS: &[&str] = &[
    r"C:\Program Files\DMD\dmd2",
    r"C:\Program Files (x86)\DMD\dmd2",
    r"C:\DMD\dmd2",
];

/// Facts about the host the profile tables depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// Architecture of the machine running the build
    pub host_arch: Arch,
    /// MSVC toolset directory (`...\VC\Tools\MSVC\<version>`)
    pub msvc_dir: PathBuf,
    /// Windows Kits root
    pub kits_dir: PathBuf,
    pub sdk_version: String,
    /// D install root (`...\dmd2`) when one was found
    pub d_dir: Option<PathBuf>,
    /// Output of `gcc -dumpversion`
    pub gcc_version: String,
    /// Entries of LD_LIBRARY_PATH
    pub ld_library_path: Vec<PathBuf>,
    /// Whether `dmd` is on PATH
    pub dmd_on_path: bool,
}

impl Default for HostPaths {
    fn default() -> Self {
        HostPaths {
            host_arch: Arch::X64,
            msvc_dir: PathBuf::new(),
            kits_dir: PathBuf::from(r"C:\Program Files (x86)\Windows Kits\10"),
            sdk_version: WINDOWS_SDK_VERSION.to_string(),
            d_dir: None,
            gcc_version: "0.0.0".to_string(),
            ld_library_path: Vec::new(),
            dmd_on_path: false,
        }
    }
}

/// Resolve the toolchain profile for a run.
///
/// Resolution order:
/// 1. Platform tables for the host family
/// 2. CC, CXX and DC environment variables
/// 3. Toolchain config files (`.wsbuild/toolchain.toml`, `~/.wsbuild/toolchain.toml`)
pub fn resolve_profile(
    mode: BuildMode,
    workspace_root: &Path,
) -> Result<ToolchainProfile, BuildError> {
    let platform = PlatformFamily::host()?;
    let arch = mode.arch_or(Arch::host());
    let build_type = mode.build_type();

    let global = global_toolchain_config_path();
    let config = load_toolchain_config(
        global.as_deref(),
        &workspace_toolchain_config_path(workspace_root),
    );
    let settings = config
        .toolchain
        .with_env_fallback(|name| std::env::var(name).ok());

    let probe_cc = settings.cc.clone().unwrap_or_else(|| PathBuf::from("gcc"));
    let host = detect_host(platform, &probe_cc);
    tracing::debug!("host toolchain paths: {:?}", host);

    let profile =
        ToolchainProfile::for_target(platform, arch, build_type, &host).with_overrides(&settings);

    tracing::debug!(
        "resolved {} toolchain for {} {}",
        platform,
        arch,
        build_type.as_str()
    );
    Ok(profile)
}

/// Probe the host for the paths the platform tables need.
pub fn detect_host(platform: PlatformFamily, c_compiler: &Path) -> HostPaths {
    let mut host = HostPaths {
        host_arch: Arch::host(),
        ..Default::default()
    };

    match platform {
        PlatformFamily::Windows => {
            let program_files = std::env::var_os("ProgramFiles(x86)")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));
            let vs_root = program_files.join("Microsoft Visual Studio").join("2017");

            host.msvc_dir = find_msvc_dir(&vs_root);
            host.kits_dir = program_files.join("Windows Kits").join("10");
            host.d_dir = find_d_dir(D_INSTALL_DIRS.iter().map(PathBuf::from));

            if host.d_dir.is_none() {
                tracing::debug!("no D installation found");
            }
        }
        PlatformFamily::Posix => {
            host.gcc_version = gcc_version(c_compiler);
            host.ld_library_path = std::env::var_os("LD_LIBRARY_PATH")
                .map(|v| split_library_path(&v))
                .unwrap_or_default();
            host.dmd_on_path = find_executable("dmd").is_some();
        }
    }

    host
}

/// Locate the newest MSVC toolset under a Visual Studio 2017 root.
///
/// Falls back to `<vs_root>\VC\Tools\MSVC` when no edition or toolset exists.
pub fn find_msvc_dir(vs_root: &Path) -> PathBuf {
    let edition_root = VS_EDITIONS
        .iter()
        .map(|edition| vs_root.join(edition))
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| {
            tracing::warn!(
                "no Visual Studio 2017 edition found under {}",
                vs_root.display()
            );
            vs_root.to_path_buf()
        });

    let tools = edition_root.join("VC").join("Tools").join("MSVC");
    let newest = std::fs::read_dir(&tools).ok().and_then(|entries| {
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.path())
            .max()
    });

    match newest {
        Some(dir) => dir,
        None => {
            tracing::warn!("no MSVC toolset found in {}", tools.display());
            tools
        }
    }
}

/// First existing D install directory.
pub fn find_d_dir(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|dir| dir.is_dir())
}

fn split_library_path(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

fn gcc_version(compiler: &Path) -> String {
    match ProcessBuilder::new(compiler).arg("-dumpversion").exec_and_check() {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
        Err(e) => {
            tracing::warn!("could not query compiler version: {:#}", e);
            HostPaths::default().gcc_version
        }
    }
}
