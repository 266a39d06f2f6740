//! Compile stage: one compiler invocation per source file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::discovery::compilation_units;
use crate::builder::errors::BuildError;
use crate::builder::executor::{require_tool, run_checked};
use crate::builder::toolchain::{CommandSpec, ToolchainProfile};
use crate::core::language::Language;
use crate::core::project::ProjectConfig;
use crate::util::fs::ensure_dir;
use crate::util::Status;

/// One source file of a project, compiled as one language.
#[derive(Debug, Clone)]
pub struct CompileUnit<'a> {
    pub project: &'a ProjectConfig,
    pub language: Language,
    pub source: PathBuf,
}

impl<'a> CompileUnit<'a> {
    pub fn new(project: &'a ProjectConfig, language: Language, source: impl Into<PathBuf>) -> Self {
        CompileUnit {
            project,
            language,
            source: source.into(),
        }
    }

    /// `<output>/code/<key>/<bucket>/<path below sourcedir>.<ext>`.
    ///
    /// The full source file name is kept (`main.c.o`) so units differing only
    /// in extension never share an object.
    pub fn object_path(&self, object_extension: &str) -> PathBuf {
        let source_root = self.project.source_root();
        let relative: &Path = match self.source.strip_prefix(&source_root) {
            Ok(rel) => rel,
            Err(_) => self
                .source
                .file_name()
                .map(Path::new)
                .unwrap_or(&self.source),
        };

        let mut name = OsString::from(relative.as_os_str());
        name.push(".");
        name.push(object_extension);

        self.project
            .object_dir()
            .join(self.language.bucket())
            .join(name)
    }
}

/// Include directories for a project's compiles, in search order: the
/// project's own include directory, the profile's global directories, then
/// the include directories of projects earlier in the build order.
pub fn include_dirs(
    profile: &ToolchainProfile,
    workspace_root: &Path,
    project: &ProjectConfig,
    earlier: &[ProjectConfig],
) -> Vec<PathBuf> {
    let mut dirs = vec![project.include_root()];
    dirs.extend(profile.include_dirs.iter().map(|d| workspace_root.join(d)));
    dirs.extend(earlier.iter().map(ProjectConfig::include_root));
    dirs
}

/// Build the invocation compiling `unit` into `object`.
///
/// Order: compiler, profile flags, include flags, language and output-kind
/// flags, output flag, source.
pub fn compile_command(
    profile: &ToolchainProfile,
    compiler: &Path,
    unit: &CompileUnit<'_>,
    include_dirs: &[PathBuf],
    object: &Path,
) -> CommandSpec {
    let lang = profile.language(unit.language);

    let mut cmd = CommandSpec::new(compiler).args(lang.compile_flags.iter().cloned());
    for dir in include_dirs {
        cmd = cmd.args(lang.include_flag.render(dir.display()));
    }
    cmd.args(lang.language_flags.iter().cloned())
        .args(lang.kind_flags.get(unit.project.output_kind).iter().cloned())
        .args(lang.output_flag.render(object.display()))
        .arg(unit.source.display().to_string())
}

/// Compile one unit, returning its object path.
pub fn compile(
    ctx: &BuildContext,
    unit: &CompileUnit<'_>,
    include_dirs: &[PathBuf],
) -> Result<PathBuf, BuildError> {
    let profile = &ctx.profile;
    let tool = format!("{} compiler", unit.language);
    let compiler = require_tool(
        ctx.locator.as_ref(),
        &tool,
        &profile.language(unit.language).compiler,
    )?;

    let object = unit.object_path(&profile.object_extension);
    if let Some(parent) = object.parent() {
        ensure_dir(parent)?;
    }

    let cmd = compile_command(profile, &compiler, unit, include_dirs, &object);
    ctx.shell.status(Status::Compiling, ctx.display_path(&unit.source));
    ctx.shell.command(&cmd);

    run_checked(ctx.runner.as_ref(), &cmd, |failure| BuildError::Compile {
        file: unit.source.clone(),
        failure,
    })?;

    Ok(object)
}

/// Compile every unit of a project: languages in declared order, sources in
/// discovery order. Stops at the first failure.
pub fn compile_project(
    ctx: &BuildContext,
    project: &ProjectConfig,
    include_dirs: &[PathBuf],
) -> Result<Vec<PathBuf>, BuildError> {
    let source_root = project.source_root();
    let mut objects = Vec::new();

    for &language in &project.languages {
        for source in &compilation_units(&source_root, language) {
            let unit = CompileUnit::new(project, language, source);
            objects.push(compile(ctx, &unit, include_dirs)?);
        }
    }

    if objects.is_empty() {
        ctx.shell.warn(format!(
            "no sources found for {} in {}",
            project.name,
            ctx.display_path(&source_root)
        ));
    }
    tracing::info!("compiled {} unit(s) for {}", objects.len(), project.name);
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{HostPaths, PlatformFamily};
    use crate::core::mode::{Arch, BuildType};
    use crate::core::project::OutputKind;
    use crate::test_support::{context_with, sample_project, MockRunner, StaticLocator};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn posix() -> ToolchainProfile {
        ToolchainProfile::for_target(
            PlatformFamily::Posix,
            Arch::X64,
            BuildType::Debug,
            &HostPaths::default(),
        )
    }

    #[test]
    fn test_object_path_mirrors_source_tree() {
        let project = sample_project(Path::new("/ws"), "Engine", OutputKind::Shared, &[Language::C]);
        let unit = CompileUnit::new(&project, Language::C, "/ws/engine/src/gfx/draw.c");

        assert_eq!(
            unit.object_path("o"),
            PathBuf::from("/ws/out/code/engine/c/gfx/draw.c.o")
        );
    }

    #[test]
    fn test_object_path_is_injective_across_languages() {
        let project = sample_project(
            Path::new("/ws"),
            "mixed",
            OutputKind::Executable,
            &[Language::C, Language::Cxx],
        );
        let c = CompileUnit::new(&project, Language::C, "/ws/mixed/src/main.c");
        let cxx = CompileUnit::new(&project, Language::Cxx, "/ws/mixed/src/main.cpp");
        let cxx_same_stem = CompileUnit::new(&project, Language::Cxx, "/ws/mixed/src/main.cc");

        let paths = [
            c.object_path("obj"),
            cxx.object_path("obj"),
            cxx_same_stem.object_path("obj"),
        ];
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[1], paths[2]);
    }

    #[test]
    fn test_object_path_outside_source_root_uses_file_name() {
        let project = sample_project(Path::new("/ws"), "p", OutputKind::Static, &[Language::D]);
        let unit = CompileUnit::new(&project, Language::D, "/elsewhere/x.d");

        assert_eq!(unit.object_path("o"), PathBuf::from("/ws/out/code/p/d/x.d.o"));
    }

    #[test]
    fn test_compile_command_order() {
        let profile = posix();
        let project = sample_project(Path::new("/ws"), "app", OutputKind::Executable, &[Language::C]);
        let unit = CompileUnit::new(&project, Language::C, "/ws/app/src/main.c");
        let dirs = vec![PathBuf::from("/ws/app/include")];

        let cmd = compile_command(
            &profile,
            Path::new("gcc"),
            &unit,
            &dirs,
            Path::new("/ws/out/code/app/c/main.c.o"),
        );

        let n = profile.c.compile_flags.len();
        assert_eq!(cmd.program, PathBuf::from("gcc"));
        assert_eq!(cmd.args[..n], profile.c.compile_flags[..]);
        assert_eq!(
            cmd.args[n..],
            [
                "-iquote",
                "/ws/app/include",
                "-o",
                "/ws/out/code/app/c/main.c.o",
                "/ws/app/src/main.c"
            ]
        );
    }

    #[test]
    fn test_windows_runtime_flags_follow_output_kind() {
        let profile = ToolchainProfile::for_target(
            PlatformFamily::Windows,
            Arch::X64,
            BuildType::Release,
            &HostPaths::default(),
        );
        let project = sample_project(Path::new("/ws"), "lib", OutputKind::Shared, &[Language::Cxx]);
        let unit = CompileUnit::new(&project, Language::Cxx, "/ws/lib/src/a.cpp");

        let cmd = compile_command(&profile, Path::new("cl.exe"), &unit, &[], Path::new("a.obj"));
        let tail: Vec<&str> = cmd.args.iter().rev().take(4).rev().map(String::as_str).collect();
        assert_eq!(tail, ["/TP", "/MD", "/Foa.obj", "/ws/lib/src/a.cpp"]);
    }

    #[test]
    fn test_include_dir_order() {
        let mut profile = posix();
        profile.include_dirs = vec![PathBuf::from("deps/include")];
        let root = Path::new("/ws");
        let first = sample_project(root, "first", OutputKind::Static, &[Language::C]);
        let second = sample_project(root, "second", OutputKind::Executable, &[Language::C]);

        let dirs = include_dirs(&profile, root, &second, std::slice::from_ref(&first));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/ws/second/include"),
                PathBuf::from("/ws/deps/include"),
                PathBuf::from("/ws/first/include"),
            ]
        );
    }

    #[test]
    fn test_compile_project_creates_object_dirs_and_runs_in_order() {
        let tmp = TempDir::new().unwrap();
        let project = sample_project(
            tmp.path(),
            "app",
            OutputKind::Executable,
            &[Language::Cxx, Language::C],
        );
        let src = project.source_root();
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("main.c"), "").unwrap();
        fs::write(src.join("sub").join("util.cpp"), "").unwrap();

        let runner = Arc::new(MockRunner::new());
        let ctx = context_with(posix(), tmp.path(), runner.clone(), StaticLocator::all());

        let objects = compile_project(&ctx, &project, &[]).unwrap();
        assert_eq!(
            objects,
            vec![
                project.object_dir().join("cpp").join("sub").join("util.cpp.o"),
                project.object_dir().join("c").join("main.c.o"),
            ]
        );
        assert!(project.object_dir().join("cpp").join("sub").is_dir());

        let sources: Vec<String> = runner
            .commands()
            .iter()
            .map(|c| c.args.last().unwrap().clone())
            .collect();
        assert!(sources[0].ends_with("util.cpp"));
        assert!(sources[1].ends_with("main.c"));
    }

    #[test]
    fn test_empty_project_warns() {
        let tmp = TempDir::new().unwrap();
        let project = sample_project(tmp.path(), "empty", OutputKind::Static, &[Language::C]);
        let shell = Arc::new(crate::util::Shell::capture(crate::util::Verbosity::Normal));
        let ctx = context_with(posix(), tmp.path(), Arc::new(MockRunner::new()), StaticLocator::all());
        let ctx = BuildContext { shell: shell.clone(), ..ctx };

        assert!(compile_project(&ctx, &project, &[]).unwrap().is_empty());
        assert!(shell.captured().contains("Warning no sources found for empty"));
    }

    #[test]
    fn test_missing_compiler_is_toolchain_error() {
        let tmp = TempDir::new().unwrap();
        let project = sample_project(tmp.path(), "app", OutputKind::Executable, &[Language::D]);
        fs::create_dir_all(project.source_root()).unwrap();
        fs::write(project.source_root().join("app.d"), "").unwrap();

        let runner = Arc::new(MockRunner::new());
        let ctx = context_with(posix(), tmp.path(), runner.clone(), StaticLocator::with(&["gcc"]));

        let err = compile_project(&ctx, &project, &[]).unwrap_err();
        assert!(matches!(err, BuildError::Toolchain { ref tool, .. } if tool == "d compiler"));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_first_failure_stops_project() {
        let tmp = TempDir::new().unwrap();
        let project = sample_project(tmp.path(), "app", OutputKind::Executable, &[Language::C]);
        let src = project.source_root();
        fs::create_dir_all(&src).unwrap();
        for name in ["a.c", "b.c", "c.c"] {
            fs::write(src.join(name), "").unwrap();
        }

        let runner = Arc::new(MockRunner::new().fail_when("b.c", &["b.c:1: error: boom"]));
        let ctx = context_with(posix(), tmp.path(), runner.clone(), StaticLocator::all());

        let err = compile_project(&ctx, &project, &[]).unwrap_err();
        assert!(matches!(err, BuildError::Compile { ref file, .. } if file.ends_with("b.c")));
        assert_eq!(runner.commands().len(), 2);
    }
}
