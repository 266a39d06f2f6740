//! Build-type tokens: `debug`, `release`, their `32`/`64` variants, and `lint`.

use std::fmt;
use std::str::FromStr;

use crate::core::errors::ConfigError;

/// Optimization profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildType::Debug)
    }
}

/// Target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X64,
}

impl Arch {
    /// Architecture of the machine running the build.
    pub fn host() -> Self {
        Arch::from_machine(std::env::consts::ARCH)
    }

    /// Map a machine name to an architecture: anything ending in `64` is x64.
    pub fn from_machine(machine: &str) -> Self {
        if machine.ends_with("64") {
            Arch::X64
        } else {
            Arch::X86
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Arch::X64)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a run does, as selected by the CLI token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Compile and link every project. `arch` is `None` when the token had
    /// no `32`/`64` suffix, meaning "the host architecture".
    Build {
        build_type: BuildType,
        arch: Option<Arch>,
    },
    /// Format sources in place.
    Lint,
}

impl BuildMode {
    /// The architecture to build for, falling back to `host`.
    pub fn arch_or(&self, host: Arch) -> Arch {
        match self {
            BuildMode::Build {
                arch: Some(arch), ..
            } => *arch,
            _ => host,
        }
    }

    /// The build type; lint runs resolve toolchains as release.
    pub fn build_type(&self) -> BuildType {
        match self {
            BuildMode::Build { build_type, .. } => *build_type,
            BuildMode::Lint => BuildType::Release,
        }
    }

    pub fn is_lint(&self) -> bool {
        matches!(self, BuildMode::Lint)
    }
}

impl FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "lint" {
            return Ok(BuildMode::Lint);
        }

        let (build_type, rest) = if let Some(rest) = s.strip_prefix("debug") {
            (BuildType::Debug, rest)
        } else if let Some(rest) = s.strip_prefix("release") {
            (BuildType::Release, rest)
        } else {
            return Err(ConfigError::InvalidMode(s.to_string()));
        };

        let arch = match rest {
            "" => None,
            "32" => Some(Arch::X86),
            "64" => Some(Arch::X64),
            _ => return Err(ConfigError::InvalidMode(s.to_string())),
        };

        Ok(BuildMode::Build { build_type, arch })
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Lint => f.write_str("lint"),
            BuildMode::Build { build_type, arch } => {
                f.write_str(build_type.as_str())?;
                match arch {
                    Some(Arch::X86) => f.write_str("32"),
                    Some(Arch::X64) => f.write_str("64"),
                    None => Ok(()),
                }
            }
        }
    }
}
