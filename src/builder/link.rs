//! Link stage: one linker (or archiver) invocation per project.

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::errors::BuildError;
use crate::builder::executor::{require_tool, run_checked};
use crate::builder::toolchain::{CommandSpec, ToolchainProfile};
use crate::core::project::{OutputKind, ProjectConfig};
use crate::util::fs::{copy_matching, ensure_dir};
use crate::util::Status;

/// Where a project's artifact is written.
pub fn artifact_path(profile: &ToolchainProfile, project: &ProjectConfig) -> PathBuf {
    project
        .output_path
        .join(profile.artifact_file_name(project.output_kind, &project.output_name))
}

/// Libraries to link: platform defaults, then the project's dependencies
/// after the platform rewrite table.
pub fn libraries(profile: &ToolchainProfile, project: &ProjectConfig) -> Vec<String> {
    let mut libs = profile.linker.default_libs.clone();
    libs.extend(
        project
            .depends_on
            .iter()
            .map(|name| profile.rewrite_library(name)),
    );
    libs
}

/// Library search directories: the prebuilt dependency directory (if the
/// platform has one), the project's output directory, then profile dirs.
pub fn library_dirs(
    profile: &ToolchainProfile,
    workspace_root: &Path,
    project: &ProjectConfig,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(deps) = &profile.dependency_lib_dir {
        dirs.push(workspace_root.join(deps));
    }
    dirs.push(project.output_path.clone());
    dirs.extend(profile.linker.lib_dirs.iter().cloned());
    dirs
}

/// Linker invocation for an executable or shared library.
pub fn link_command(
    profile: &ToolchainProfile,
    linker: &Path,
    workspace_root: &Path,
    project: &ProjectConfig,
    objects: &[PathBuf],
) -> CommandSpec {
    let rec = &profile.linker;
    let artifact = artifact_path(profile, project);

    let mut cmd = CommandSpec::new(linker)
        .args(rec.link_flags.iter().cloned())
        .args(objects.iter().map(|o| o.display().to_string()))
        .args(rec.kind_flags.get(project.output_kind).iter().cloned())
        .args(rec.output_flag.render(artifact.display()));

    for dir in library_dirs(profile, workspace_root, project) {
        cmd = cmd.args(rec.lib_search_flag.render(dir.display()));
    }
    for lib in libraries(profile, project) {
        cmd = cmd.args(
            rec.lib_link_flag
                .render(format!("{}{}", lib, rec.lib_file_suffix)),
        );
    }
    cmd
}

/// Archiver invocation for a static library. Libraries are not passed.
pub fn archive_command(
    profile: &ToolchainProfile,
    archiver: &Path,
    project: &ProjectConfig,
    objects: &[PathBuf],
) -> CommandSpec {
    let rec = &profile.linker;
    let artifact = artifact_path(profile, project);

    CommandSpec::new(archiver)
        .args(rec.archive_flags.iter().cloned())
        .args(rec.archive_output_flag.render(artifact.display()))
        .args(objects.iter().map(|o| o.display().to_string()))
}

/// Produce the project's artifact from its objects.
pub fn link(
    ctx: &BuildContext,
    project: &ProjectConfig,
    objects: &[PathBuf],
) -> Result<PathBuf, BuildError> {
    let profile = &ctx.profile;
    let artifact = artifact_path(profile, project);
    ensure_dir(&project.output_path)?;
    copy_dependency_libraries(ctx, project)?;

    let cmd = match project.output_kind {
        OutputKind::Static => {
            let archiver = require_tool(ctx.locator.as_ref(), "archiver", &profile.linker.archiver)?;
            ctx.shell.status(Status::Archiving, &project.name);
            archive_command(profile, &archiver, project, objects)
        }
        OutputKind::Executable | OutputKind::Shared => {
            let linker = require_tool(ctx.locator.as_ref(), "linker", &profile.linker.linker)?;
            ctx.shell.status(Status::Linking, &project.name);
            link_command(profile, &linker, &ctx.workspace_root, project, objects)
        }
    };
    ctx.shell.command(&cmd);

    run_checked(ctx.runner.as_ref(), &cmd, |failure| BuildError::Link {
        artifact: artifact.clone(),
        failure,
    })?;

    tracing::info!("produced {}", artifact.display());
    Ok(artifact)
}

/// Copy prebuilt shared libraries next to the artifact so it runs in place.
fn copy_dependency_libraries(ctx: &BuildContext, project: &ProjectConfig) -> Result<(), BuildError> {
    let Some(deps) = &ctx.profile.dependency_lib_dir else {
        return Ok(());
    };

    let copied = copy_matching(&ctx.workspace_root.join(deps), &project.output_path, "*.dll")?;
    if !copied.is_empty() {
        tracing::debug!(
            "copied {} dependency librar(ies) into {}",
            copied.len(),
            project.output_path.display()
        );
    }
    Ok(())
}
