//! GNU toolchain table (POSIX hosts).

use std::path::PathBuf;

use crate::core::mode::{Arch, BuildType};

use super::{
    ByKind, FlagSyntax, Formatter, HostPaths, LanguageProfile, LinkerProfile, PlatformFamily,
    ToolchainProfile,
};

const C_FLAGS: &[&str] = &[
    "-c",
    "-fPIC",
    "-mtune=generic",
    "-mfpmath=sse",
    "-x",
    "c",
    "-std=c11",
    "-pipe",
];

const CXX_FLAGS: &[&str] = &[
    "-c",
    "-fPIC",
    "-mtune=generic",
    "-mfpmath=sse",
    "-x",
    "c++",
    "-std=c++14",
    "-pipe",
];

const DEFAULT_LIBS: &[&str] = &["gcc_s", "c", "gcc_s", "stdc++", "m", "gcc_s", "c", "gcc_s"];

fn strings(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|s| s.to_string()).collect()
}

/// Architecture and build-type flags shared by C and C++.
fn machine_flags(arch: Arch, build_type: BuildType) -> Vec<&'static str> {
    let mut flags = match arch {
        Arch::X64 => vec!["-m64", "-march=sandybridge", "-mavx", "-DARCH=64"],
        Arch::X86 => vec!["-m32", "-march=pentium4", "-DARCH=32"],
    };
    flags.push(if build_type.is_debug() {
        "-UNDEBUG"
    } else {
        "-DNDEBUG=1"
    });
    flags
}

/// D compiler flags; identical on every platform.
pub(super) fn d_flags(arch: Arch, build_type: BuildType) -> Vec<String> {
    let mut flags = vec!["-color", "-c"];
    if build_type.is_debug() {
        flags.extend(["-debug", "-g", "-gs", "-boundscheck=on", "-w"]);
    } else {
        flags.extend(["-boundscheck=off", "-O", "-release", "-wi"]);
    }
    match arch {
        Arch::X86 => flags.extend(["-m32", "-mcpu=baseline"]),
        Arch::X64 => flags.extend(["-m64", "-mcpu=avx"]),
    }
    strings(&flags)
}

/// D compiler record without the compiler path.
pub(super) fn d_language(compiler: PathBuf, arch: Arch, build_type: BuildType) -> LanguageProfile {
    LanguageProfile {
        compiler,
        compile_flags: d_flags(arch, build_type),
        language_flags: Vec::new(),
        kind_flags: ByKind {
            shared: vec!["-shared".to_string()],
            ..Default::default()
        },
        include_flag: FlagSyntax::Joined("-I=".to_string()),
        output_flag: FlagSyntax::Joined("-of=".to_string()),
    }
}

fn c_language(base: &[&str], arch: Arch, build_type: BuildType) -> LanguageProfile {
    let mut compile_flags = strings(base);
    compile_flags.extend(strings(&machine_flags(arch, build_type)));

    LanguageProfile {
        compiler: PathBuf::from("gcc"),
        compile_flags,
        language_flags: Vec::new(),
        kind_flags: ByKind::default(),
        include_flag: FlagSyntax::Separate("-iquote".to_string()),
        output_flag: FlagSyntax::Separate("-o".to_string()),
    }
}

pub(super) fn profile(arch: Arch, build_type: BuildType, host: &HostPaths) -> ToolchainProfile {
    let mut default_libs = strings(DEFAULT_LIBS);
    if host.dmd_on_path {
        default_libs.push("phobos2".to_string());
    }

    let mut lib_dirs = vec![PathBuf::from(format!(
        "/usr/lib/gcc/x86_64-pc-linux-gnu/{}",
        host.gcc_version
    ))];
    lib_dirs.extend(host.ld_library_path.iter().cloned());

    ToolchainProfile {
        platform: PlatformFamily::Posix,
        arch,
        build_type,
        object_extension: "o".to_string(),
        c: c_language(C_FLAGS, arch, build_type),
        cxx: c_language(CXX_FLAGS, arch, build_type),
        d: d_language(PathBuf::from("dmd"), arch, build_type),
        linker: LinkerProfile {
            linker: PathBuf::from("g++"),
            link_flags: vec!["-fuse-ld=gold".to_string()],
            kind_flags: ByKind {
                shared: vec!["-shared".to_string()],
                ..Default::default()
            },
            output_flag: FlagSyntax::Separate("-o".to_string()),
            lib_search_flag: FlagSyntax::Joined("-L".to_string()),
            lib_link_flag: FlagSyntax::Joined("-l".to_string()),
            lib_file_suffix: String::new(),
            archiver: PathBuf::from("ar"),
            archive_flags: vec!["rcs".to_string()],
            archive_output_flag: FlagSyntax::Bare,
            artifact_prefix: ByKind::of("", "lib", "lib"),
            artifact_extension: ByKind::of("", ".so", ".a"),
            default_libs,
            lib_dirs,
            rewrites: Vec::new(),
        },
        include_dirs: Vec::new(),
        dependency_lib_dir: None,
        c_formatter: Formatter {
            program: "clang-format".to_string(),
            args: vec!["-i".to_string(), "-style=file".to_string()],
        },
        d_formatter: Formatter {
            program: "dfmt".to_string(),
            args: vec!["-i".to_string()],
        },
    }
}
