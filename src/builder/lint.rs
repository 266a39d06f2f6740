//! Lint stage: format every source and header in place.

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::discovery::discover;
use crate::builder::errors::BuildError;
use crate::builder::executor::{require_tool, run_checked};
use crate::builder::toolchain::{CommandSpec, Formatter};
use crate::core::language::Language;
use crate::core::project::ProjectConfig;
use crate::util::Status;

/// D files go to the D formatter; everything else to the C family one.
fn formats_as_d(path: &Path) -> bool {
    let d = Language::D;
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            d.source_extensions().contains(&ext) || d.header_extensions().contains(&ext)
        })
        .unwrap_or(false)
}

pub fn lint_command(formatter: &Formatter, program: &Path, file: &Path) -> CommandSpec {
    CommandSpec::new(program)
        .args(formatter.args.iter().cloned())
        .arg(file.display().to_string())
}

/// Format a project's files. Every formatter the project needs is resolved
/// before any file is touched. Returns the number of files formatted.
pub fn lint(ctx: &BuildContext, project: &ProjectConfig) -> Result<usize, BuildError> {
    let profile = &ctx.profile;

    let mut c_family: Option<PathBuf> = None;
    let mut d: Option<PathBuf> = None;
    for &lang in &project.languages {
        let formatter = profile.formatter(lang);
        let slot = if lang == Language::D { &mut d } else { &mut c_family };
        if slot.is_none() {
            let program = Path::new(&formatter.program);
            *slot = Some(require_tool(ctx.locator.as_ref(), "formatter", program)?);
        }
    }

    ctx.shell.status(Status::Linting, &project.name);

    let mut count = 0;
    for file in &discover(&project.source_root(), &project.languages, true) {
        let (formatter, program) = if formats_as_d(&file) {
            (profile.formatter(Language::D), d.as_ref())
        } else {
            (profile.formatter(Language::C), c_family.as_ref())
        };
        // Extensions only come from selected languages, so the slot is set.
        let Some(program) = program else {
            continue;
        };

        let cmd = lint_command(formatter, program, &file);
        ctx.shell.command(&cmd);
        run_checked(ctx.runner.as_ref(), &cmd, |failure| BuildError::Lint {
            file: file.clone(),
            failure,
        })?;
        count += 1;
    }

    tracing::info!("formatted {} file(s) for {}", count, project.name);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{HostPaths, PlatformFamily, ToolchainProfile};
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
            BuildType::Release,
            &HostPaths::default(),
        )
    }

    fn project_with(tmp: &TempDir, langs: &[Language], files: &[&str]) -> ProjectConfig {
        let project = sample_project(tmp.path(), "app", OutputKind::Executable, langs);
        for file in files {
            let path = project.source_root().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        project
    }

    #[test]
    fn test_formats_sources_and_headers() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(
            &tmp,
            &[Language::Cxx, Language::D],
            &["main.cpp", "main.hpp", "mod/package.d", "mod/api.di", "readme.md"],
        );
        let runner = Arc::new(MockRunner::new());
        let ctx = context_with(posix(), tmp.path(), runner.clone(), StaticLocator::all());

        assert_eq!(lint(&ctx, &project).unwrap(), 4);

        let commands = runner.commands();
        let dfmt: Vec<_> = commands
            .iter()
            .filter(|c| c.program == Path::new("dfmt"))
            .collect();
        assert_eq!(dfmt.len(), 2);
        assert!(dfmt.iter().any(|c| c.args.last().unwrap().ends_with("package.d")));

        let clang: Vec<_> = commands
            .iter()
            .filter(|c| c.program == Path::new("clang-format"))
            .collect();
        assert_eq!(clang.len(), 2);
        assert_eq!(clang[0].args[..2], ["-i", "-style=file"]);
    }

    #[test]
    fn test_missing_formatter_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(&tmp, &[Language::D, Language::Cxx], &["a.d", "b.cpp"]);
        let runner = Arc::new(MockRunner::new());
        let ctx = context_with(posix(), tmp.path(), runner.clone(), StaticLocator::with(&["dfmt"]));

        let err = lint(&ctx, &project).unwrap_err();
        assert!(
            matches!(err, BuildError::Toolchain { ref program, .. } if program == Path::new("clang-format"))
        );
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_shared_formatter_resolved_once_for_c_and_cxx() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(&tmp, &[Language::C, Language::Cxx], &["a.c", "b.cc", "c.h"]);
        let runner = Arc::new(MockRunner::new());
        let ctx = context_with(
            posix(),
            tmp.path(),
            runner.clone(),
            StaticLocator::with(&["clang-format"]),
        );

        assert_eq!(lint(&ctx, &project).unwrap(), 3);
    }

    #[test]
    fn test_formatter_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        let project = project_with(&tmp, &[Language::C], &["a.c", "b.c"]);
        let runner = Arc::new(MockRunner::new().fail_when("a.c", &["invalid .clang-format"]));
        let ctx = context_with(posix(), tmp.path(), runner.clone(), StaticLocator::all());

        let err = lint(&ctx, &project).unwrap_err();
        assert!(matches!(err, BuildError::Lint { .. }));
        assert_eq!(runner.commands().len(), 1);
    }
}
