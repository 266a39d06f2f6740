//! Microsoft toolchain table (Windows hosts).

use std::path::{Path, PathBuf};

use crate::core::mode::{Arch, BuildType};

use super::gcc::d_language;
use super::{
    ByKind, FlagSyntax, Formatter, HostPaths, LanguageProfile, LibraryRewrite, LinkerProfile,
    PlatformFamily, ToolchainProfile,
};

const COMMON_FLAGS: &[&str] = &["/bigobj", "/c", "/GF", "/nologo", "/Za", "/std:c++14", "/EHsc"];

const LINK_FLAGS: &[&str] = &[
    "/CGTHREADS:8",
    "/DYNAMICBASE",
    "/LARGEADDRESSAWARE",
    "/NOLOGO",
    "/NODEFAULTLIB:libcmt",
];

const SYSTEM_LIBS: &[&str] = &[
    "kernel32",
    "user32",
    "gdi32",
    "winspool",
    "comdlg32",
    "advapi32",
    "shell32",
    "ole32",
    "oleaut32",
    "uuid",
    "odbc32",
    "odbccp32",
    "legacy_stdio_definitions",
];

/// Extra system libraries the D runtime needs.
const D_RUNTIME_LIBS: &[&str] = &[
    "comctl32", "gdi32", "glu32", "opengl32", "rpcrt4", "version", "wininet", "winmm", "ws2_32",
    "wsock32",
];

fn strings(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|s| s.to_string()).collect()
}

fn winarch(arch: Arch) -> &'static str {
    match arch {
        Arch::X64 => "X64",
        Arch::X86 => "X86",
    }
}

/// `bin\Host<host>\<target>` under the MSVC toolset.
fn msvc_bin(host: &HostPaths, target: Arch) -> PathBuf {
    host.msvc_dir
        .join("bin")
        .join(format!("Host{}", winarch(host.host_arch)))
        .join(target.as_str())
}

fn c_language(compiler: &Path, arch: Arch, build_type: BuildType, select: &str) -> LanguageProfile {
    let mut compile_flags = strings(COMMON_FLAGS);
    match arch {
        Arch::X86 => compile_flags.extend(strings(&["/arch:SSE2", "/DARCH=32"])),
        Arch::X64 => compile_flags.extend(strings(&["/arch:AVX", "/DARCH=64"])),
    }
    if build_type.is_debug() {
        compile_flags.extend(strings(&["/Od", "/W3", "/UNDEBUG"]));
    } else {
        compile_flags.extend(strings(&["/GLdwy", "/O2t", "/w", "/DNDEBUG=1"]));
    }

    let (static_runtime, dynamic_runtime) = if build_type.is_debug() {
        ("/MTd", "/MDd")
    } else {
        ("/MT", "/MD")
    };

    LanguageProfile {
        compiler: compiler.to_path_buf(),
        compile_flags,
        language_flags: vec![select.to_string()],
        kind_flags: ByKind {
            executable: vec![static_runtime.to_string()],
            shared: vec![dynamic_runtime.to_string()],
            static_lib: Vec::new(),
        },
        include_flag: FlagSyntax::Joined("/I".to_string()),
        output_flag: FlagSyntax::Joined("/Fo".to_string()),
    }
}

pub(super) fn profile(arch: Arch, build_type: BuildType, host: &HostPaths) -> ToolchainProfile {
    let bin = msvc_bin(host, arch);
    let cl = bin.join("cl.exe");
    let sdk = &host.sdk_version;

    let mut link_flags = strings(LINK_FLAGS);
    link_flags.push(format!("/MACHINE:{}", winarch(arch)));
    if build_type.is_debug() {
        link_flags.extend(strings(&["/DEBUG", "/OPT:NOREF", "/SUBSYSTEM:CONSOLE"]));
    } else {
        link_flags.extend(strings(&["/RELEASE", "/OPT:REF", "/SUBSYSTEM:WINDOWS"]));
    }

    let kits_lib = host.kits_dir.join("lib").join(sdk);
    let mut lib_dirs = vec![
        kits_lib.clone(),
        host.msvc_dir.join("lib").join(arch.as_str()),
        kits_lib.join("ucrt").join(arch.as_str()),
        kits_lib.join("um").join(arch.as_str()),
    ];
    let mut default_libs = strings(SYSTEM_LIBS);

    let dc = match &host.d_dir {
        Some(d_dir) => {
            lib_dirs.push(d_dir.join("windows").join("lib"));
            default_libs.extend(strings(D_RUNTIME_LIBS));
            if host.host_arch.is_64bit() {
                lib_dirs.push(d_dir.join("windows").join("lib64"));
                default_libs.push(if arch.is_64bit() { "phobos64" } else { "phobos" }.to_string());
            }
            d_dir.join("windows").join("bin").join("dmd.exe")
        }
        None => PathBuf::from("dmd.exe"),
    };

    let kits_include = host.kits_dir.join("include").join(sdk);
    let include_dirs = vec![
        host.msvc_dir.join("include"),
        kits_include.join("shared"),
        kits_include.join("ucrt"),
        kits_include.join("um"),
        PathBuf::from("deps").join("include"),
    ];

    let boost_suffix = if build_type.is_debug() {
        "-vc141-mt-gd-1_64"
    } else {
        "-vc141-mt-1_64"
    };

    let deps_bits = if host.host_arch.is_64bit() { "lib64" } else { "lib32" };

    ToolchainProfile {
        platform: PlatformFamily::Windows,
        arch,
        build_type,
        object_extension: "obj".to_string(),
        c: c_language(&cl, arch, build_type, "/TC"),
        cxx: c_language(&cl, arch, build_type, "/TP"),
        d: d_language(dc, arch, build_type),
        linker: LinkerProfile {
            linker: bin.join("link.exe"),
            link_flags,
            kind_flags: ByKind {
                shared: vec!["/DLL".to_string()],
                ..Default::default()
            },
            output_flag: FlagSyntax::Joined("/OUT:".to_string()),
            lib_search_flag: FlagSyntax::Joined("/LIBPATH:".to_string()),
            lib_link_flag: FlagSyntax::Joined("/DEFAULTLIB:".to_string()),
            lib_file_suffix: ".lib".to_string(),
            archiver: bin.join("lib.exe"),
            archive_flags: vec!["/NOLOGO".to_string()],
            archive_output_flag: FlagSyntax::Joined("/OUT:".to_string()),
            artifact_prefix: ByKind::default(),
            artifact_extension: ByKind::of(".exe", ".dll", ".lib"),
            default_libs,
            lib_dirs,
            rewrites: vec![
                LibraryRewrite::Replace {
                    from: "sfml-".to_string(),
                    to: "sfml".to_string(),
                },
                LibraryRewrite::SuffixForPrefix {
                    prefix: "boost".to_string(),
                    suffix: boost_suffix.to_string(),
                },
            ],
        },
        include_dirs,
        dependency_lib_dir: Some(
            PathBuf::from("deps")
                .join(deps_bits)
                .join(build_type.as_str()),
        ),
        c_formatter: Formatter {
            program: "clang-format.exe".to_string(),
            args: vec!["-i".to_string(), "-style=file".to_string()],
        },
        d_formatter: Formatter {
            program: "dfmt.exe".to_string(),
            args: vec!["-i".to_string()],
        },
    }
}
