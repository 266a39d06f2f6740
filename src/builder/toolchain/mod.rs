//! Toolchain profiles for C, C++ and D.
//!
//! A [`ToolchainProfile`] is a plain table: for each language the compiler
//! and its flags, plus one linker record. It is computed once per run from
//! the host (see [`detect`]) and shared read-only by every stage, so tests
//! can construct one by hand.
//!
//! Profile resolution order:
//! 1. Platform tables (`gcc.rs` for POSIX, `msvc.rs` for Windows)
//! 2. Environment variables (CC, CXX, DC) replacing default compilers
//! 3. Toolchain config files (`.wsbuild/toolchain.toml`, `~/.wsbuild/toolchain.toml`)

use std::fmt;
use std::path::PathBuf;

use crate::builder::errors::BuildError;
use crate::core::language::Language;
use crate::core::mode::{Arch, BuildType};
use crate::core::project::OutputKind;
use crate::util::config::ToolchainSettings;

pub mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_host, resolve_profile, HostPaths};

/// Operating-system family the profile targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Microsoft toolchain (cl.exe / link.exe)
    Windows,
    /// GNU toolchain on Unix-like systems
    Posix,
}

impl PlatformFamily {
    /// Platform family of the running host.
    pub fn host() -> Result<Self, BuildError> {
        Self::from_os(std::env::consts::OS, cfg!(unix))
    }

    fn from_os(os: &str, unix: bool) -> Result<Self, BuildError> {
        if os == "windows" {
            Ok(PlatformFamily::Windows)
        } else if unix {
            Ok(PlatformFamily::Posix)
        } else {
            Err(BuildError::UnsupportedPlatform(os.to_string()))
        }
    }

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Windows => "windows",
            PlatformFamily::Posix => "posix",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a flag carries its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagSyntax {
    /// Flag and value are separate arguments: `-o out.o`
    Separate(String),
    /// Value is appended to the flag: `/Foout.obj`, `-L/usr/lib`
    Joined(String),
    /// Value stands alone: `ar rcs libfoo.a`
    Bare,
}

impl FlagSyntax {
    /// Render the flag for a value.
    pub fn render(&self, value: impl fmt::Display) -> Vec<String> {
        match self {
            FlagSyntax::Separate(flag) => vec![flag.clone(), value.to_string()],
            FlagSyntax::Joined(flag) => vec![format!("{}{}", flag, value)],
            FlagSyntax::Bare => vec![value.to_string()],
        }
    }
}

/// One value per output kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByKind<T> {
    pub executable: T,
    pub shared: T,
    pub static_lib: T,
}

impl<T> ByKind<T> {
    pub fn get(&self, kind: OutputKind) -> &T {
        match kind {
            OutputKind::Executable => &self.executable,
            OutputKind::Shared => &self.shared,
            OutputKind::Static => &self.static_lib,
        }
    }
}

impl ByKind<String> {
    fn of(executable: &str, shared: &str, static_lib: &str) -> Self {
        ByKind {
            executable: executable.to_string(),
            shared: shared.to_string(),
            static_lib: static_lib.to_string(),
        }
    }
}

/// A command to execute: program plus an argument vector.
///
/// Never joined into a shell string except for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// The command line as the user would type it into the host shell.
    pub fn display(&self) -> String {
        self.command_line(cfg!(windows))
    }

    fn command_line(&self, windows: bool) -> String {
        let program = self.program.display().to_string();
        std::iter::once(program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| quote_arg(part, windows))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quote an argument that would not survive the shell as one word.
///
/// Windows follows the `CommandLineToArgvW` rules: backslashes are doubled
/// only when they precede a quote. POSIX uses single quotes.
fn quote_arg(arg: &str, windows: bool) -> String {
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'');
    if plain {
        return arg.to_string();
    }

    if !windows {
        return format!("'{}'", arg.replace('\'', r"'\''"));
    }

    let mut quoted = String::from("\"");
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.push_str(&"\\".repeat(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.push_str(&"\\".repeat(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.push_str(&"\\".repeat(backslashes * 2));
    quoted.push('"');
    quoted
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Compiler record for one language.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    /// Compiler executable (name looked up on PATH, or a full path)
    pub compiler: PathBuf,
    /// Flags every compile of this language starts with
    pub compile_flags: Vec<String>,
    /// Flags placed after the include flags (language selection, e.g. `/TP`)
    pub language_flags: Vec<String>,
    /// Extra flags by the project's output kind (runtime selection, `-shared`)
    pub kind_flags: ByKind<Vec<String>>,
    pub include_flag: FlagSyntax,
    pub output_flag: FlagSyntax,
}

/// Source formatter used in lint mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    /// Executable name searched on PATH
    pub program: String,
    /// Arguments placed before the file name
    pub args: Vec<String>,
}

/// A platform-specific rewrite of dependency library names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryRewrite {
    /// Replace every occurrence of `from` with `to`.
    Replace { from: String, to: String },
    /// Append `suffix` to names starting with `prefix`.
    SuffixForPrefix { prefix: String, suffix: String },
}

impl LibraryRewrite {
    pub fn apply(&self, name: &str) -> String {
        match self {
            LibraryRewrite::Replace { from, to } => name.replace(from.as_str(), to),
            LibraryRewrite::SuffixForPrefix { prefix, suffix } => {
                if name.starts_with(prefix.as_str()) {
                    format!("{}{}", name, suffix)
                } else {
                    name.to_string()
                }
            }
        }
    }
}

/// Linker and archiver record.
#[derive(Debug, Clone)]
pub struct LinkerProfile {
    /// Linker for executables and shared libraries
    pub linker: PathBuf,
    pub link_flags: Vec<String>,
    /// Extra link flags by output kind (`-shared`, `/DLL`)
    pub kind_flags: ByKind<Vec<String>>,
    pub output_flag: FlagSyntax,
    pub lib_search_flag: FlagSyntax,
    pub lib_link_flag: FlagSyntax,
    /// Appended to library names on the link line (`.lib` on Windows)
    pub lib_file_suffix: String,
    /// Archiver for static libraries
    pub archiver: PathBuf,
    pub archive_flags: Vec<String>,
    pub archive_output_flag: FlagSyntax,
    pub artifact_prefix: ByKind<String>,
    /// Artifact extensions including the dot, or empty
    pub artifact_extension: ByKind<String>,
    /// Libraries every link starts with
    pub default_libs: Vec<String>,
    /// Library search directories every link gets
    pub lib_dirs: Vec<PathBuf>,
    /// Rewrites applied, in order, to dependency names
    pub rewrites: Vec<LibraryRewrite>,
}

/// The resolved toolchain for one (platform, architecture, build type).
#[derive(Debug, Clone)]
pub struct ToolchainProfile {
    pub platform: PlatformFamily,
    pub arch: Arch,
    pub build_type: BuildType,
    /// Object file extension without the dot
    pub object_extension: String,
    pub c: LanguageProfile,
    pub cxx: LanguageProfile,
    pub d: LanguageProfile,
    pub linker: LinkerProfile,
    /// Include directories added to every compile; relative entries are
    /// resolved against the workspace root
    pub include_dirs: Vec<PathBuf>,
    /// Directory of prebuilt third-party libraries, relative to the workspace
    /// root; shared libraries found there are copied next to artifacts
    pub dependency_lib_dir: Option<PathBuf>,
    pub c_formatter: Formatter,
    pub d_formatter: Formatter,
}

impl ToolchainProfile {
    /// Build the profile table for a target from probed host paths.
    pub fn for_target(
        platform: PlatformFamily,
        arch: Arch,
        build_type: BuildType,
        host: &HostPaths,
    ) -> Self {
        match platform {
            PlatformFamily::Windows => msvc::profile(arch, build_type, host),
            PlatformFamily::Posix => gcc::profile(arch, build_type, host),
        }
    }

    /// Compiler record of a language.
    pub fn language(&self, lang: Language) -> &LanguageProfile {
        match lang {
            Language::C => &self.c,
            Language::Cxx => &self.cxx,
            Language::D => &self.d,
        }
    }

    /// Formatter used to lint a language.
    pub fn formatter(&self, lang: Language) -> &Formatter {
        match lang {
            Language::C | Language::Cxx => &self.c_formatter,
            Language::D => &self.d_formatter,
        }
    }

    /// File name of an artifact: prefix + name + extension.
    pub fn artifact_file_name(&self, kind: OutputKind, name: &str) -> String {
        format!(
            "{}{}{}",
            self.linker.artifact_prefix.get(kind),
            name,
            self.linker.artifact_extension.get(kind)
        )
    }

    /// Apply the platform rewrite table to a dependency name.
    pub fn rewrite_library(&self, name: &str) -> String {
        self.linker
            .rewrites
            .iter()
            .fold(name.to_string(), |acc, rule| rule.apply(&acc))
    }

    /// Apply toolchain overrides from configuration.
    pub fn with_overrides(mut self, settings: &ToolchainSettings) -> Self {
        if let Some(cc) = &settings.cc {
            self.c.compiler = cc.clone();
        }
        if let Some(cxx) = &settings.cxx {
            self.cxx.compiler = cxx.clone();
        }
        if let Some(dc) = &settings.dc {
            self.d.compiler = dc.clone();
        }
        if let Some(linker) = &settings.linker {
            self.linker.linker = linker.clone();
        }
        if let Some(archiver) = &settings.archiver {
            self.linker.archiver = archiver.clone();
        }

        self.c.compile_flags.extend(settings.cflags.iter().cloned());
        self.cxx.compile_flags.extend(settings.cxxflags.iter().cloned());
        self.d.compile_flags.extend(settings.dflags.iter().cloned());
        self.linker.link_flags.extend(settings.ldflags.iter().cloned());

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posix(arch: Arch, build_type: BuildType) -> ToolchainProfile {
        ToolchainProfile::for_target(PlatformFamily::Posix, arch, build_type, &HostPaths::default())
    }

    fn windows(arch: Arch, build_type: BuildType) -> ToolchainProfile {
        ToolchainProfile::for_target(
            PlatformFamily::Windows,
            arch,
            build_type,
            &HostPaths::default(),
        )
    }

    #[test]
    fn test_flag_syntax_render() {
        assert_eq!(FlagSyntax::Separate("-o".into()).render("a.o"), vec!["-o", "a.o"]);
        assert_eq!(FlagSyntax::Joined("/Fo".into()).render("a.obj"), vec!["/Foa.obj"]);
        assert_eq!(FlagSyntax::Bare.render("lib.a"), vec!["lib.a"]);
    }

    #[test]
    fn test_platform_from_os() {
        assert_eq!(PlatformFamily::from_os("windows", false).unwrap(), PlatformFamily::Windows);
        assert_eq!(PlatformFamily::from_os("linux", true).unwrap(), PlatformFamily::Posix);
        assert_eq!(PlatformFamily::from_os("macos", true).unwrap(), PlatformFamily::Posix);
        assert!(matches!(
            PlatformFamily::from_os("uefi", false),
            Err(BuildError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_artifact_names_posix() {
        let p = posix(Arch::X64, BuildType::Debug);
        assert_eq!(p.artifact_file_name(OutputKind::Executable, "game"), "game");
        assert_eq!(p.artifact_file_name(OutputKind::Shared, "engine"), "libengine.so");
        assert_eq!(p.artifact_file_name(OutputKind::Static, "util"), "libutil.a");
    }

    #[test]
    fn test_artifact_names_windows() {
        let p = windows(Arch::X64, BuildType::Debug);
        assert_eq!(p.artifact_file_name(OutputKind::Executable, "game"), "game.exe");
        assert_eq!(p.artifact_file_name(OutputKind::Shared, "engine"), "engine.dll");
        assert_eq!(p.artifact_file_name(OutputKind::Static, "util"), "util.lib");
    }

    #[test]
    fn test_arch_and_build_type_flags_posix() {
        let p = posix(Arch::X86, BuildType::Release);
        assert!(p.c.compile_flags.contains(&"-m32".to_string()));
        assert!(p.c.compile_flags.contains(&"-DARCH=32".to_string()));
        assert!(p.c.compile_flags.contains(&"-DNDEBUG=1".to_string()));
        assert!(p.d.compile_flags.contains(&"-release".to_string()));

        let p = posix(Arch::X64, BuildType::Debug);
        assert!(p.cxx.compile_flags.contains(&"-mavx".to_string()));
        assert!(p.cxx.compile_flags.contains(&"-UNDEBUG".to_string()));
        assert!(p.d.compile_flags.contains(&"-boundscheck=on".to_string()));
        assert!(p.d.compile_flags.contains(&"-m64".to_string()));
    }

    #[test]
    fn test_runtime_selection_windows() {
        let debug = windows(Arch::X64, BuildType::Debug);
        assert_eq!(debug.c.kind_flags.executable, vec!["/MTd"]);
        assert_eq!(debug.cxx.kind_flags.shared, vec!["/MDd"]);
        assert!(debug.c.kind_flags.static_lib.is_empty());

        let release = windows(Arch::X86, BuildType::Release);
        assert_eq!(release.c.kind_flags.executable, vec!["/MT"]);
        assert_eq!(release.cxx.kind_flags.shared, vec!["/MD"]);
        assert!(release.linker.link_flags.contains(&"/MACHINE:X86".to_string()));
    }

    #[test]
    fn test_windows_rewrite_table() {
        let p = windows(Arch::X64, BuildType::Debug);
        assert_eq!(p.rewrite_library("sfml-graphics"), "sfmlgraphics");
        assert_eq!(p.rewrite_library("boost_system"), "boost_system-vc141-mt-gd-1_64");
        assert_eq!(p.rewrite_library("engine"), "engine");

        let p = windows(Arch::X64, BuildType::Release);
        assert_eq!(p.rewrite_library("boost_system"), "boost_system-vc141-mt-1_64");
    }

    #[test]
    fn test_posix_has_no_rewrites() {
        let p = posix(Arch::X64, BuildType::Debug);
        assert_eq!(p.rewrite_library("sfml-graphics"), "sfml-graphics");
    }

    #[test]
    fn test_overrides() {
        let settings = ToolchainSettings {
            cc: Some(PathBuf::from("/opt/gcc/bin/gcc")),
            dc: Some(PathBuf::from("ldmd2")),
            cflags: vec!["-Wall".to_string()],
            ldflags: vec!["-rdynamic".to_string()],
            ..Default::default()
        };

        let p = posix(Arch::X64, BuildType::Debug).with_overrides(&settings);
        assert_eq!(p.c.compiler, PathBuf::from("/opt/gcc/bin/gcc"));
        assert_eq!(p.cxx.compiler, PathBuf::from("gcc"));
        assert_eq!(p.d.compiler, PathBuf::from("ldmd2"));
        assert_eq!(p.c.compile_flags.last().unwrap(), "-Wall");
        assert_eq!(p.linker.link_flags.last().unwrap(), "-rdynamic");
    }

    #[test]
    fn test_command_display() {
        let cmd = CommandSpec::new("gcc").args(["-c", "main.c"]).arg("-o").arg("main.o");
        assert_eq!(cmd.display(), "gcc -c main.c -o main.o");
    }

    #[test]
    fn test_command_display_quotes_spaces() {
        let cmd = CommandSpec::new(r"C:\Program Files (x86)\MSVC\bin\cl.exe")
            .arg(r"/IC:\my dir\include")
            .arg("src/my file.c")
            .arg("/c");

        assert_eq!(
            cmd.command_line(true),
            r#""C:\Program Files (x86)\MSVC\bin\cl.exe" "/IC:\my dir\include" "src/my file.c" /c"#
        );
        assert_eq!(
            cmd.command_line(false),
            r"'C:\Program Files (x86)\MSVC\bin\cl.exe' '/IC:\my dir\include' 'src/my file.c' /c"
        );
    }

    #[test]
    fn test_quote_arg_escapes_quotes() {
        assert_eq!(quote_arg("it's", false), r"'it'\''s'");
        assert_eq!(quote_arg(r#"-DMSG="hi there""#, true), r#""-DMSG=\"hi there\"""#);
        assert_eq!(quote_arg(r"C:\my dir\", true), r#""C:\my dir\\""#);
        assert_eq!(quote_arg(r"C:\plain\path", true), r"C:\plain\path");
        assert_eq!(quote_arg("", false), "''");
    }
}
