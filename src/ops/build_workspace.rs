//! Implementation of a workspace run: `wsbuild <workspace.ini> <mode>`.
//!
//! A run moves through fixed states:
//!
//! ```text
//! Init -> ResolvingProjects -> Linting | Building -> Passed | Failed
//! ```
//!
//! Every descriptor is loaded and validated before any tool is invoked.
//! Projects are then processed strictly in declared order; the first failure
//! ends the run and later projects are not attempted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::builder::compile::{compile_project, include_dirs};
use crate::builder::context::BuildContext;
use crate::builder::errors::{BuildError, CommandFailure};
use crate::builder::link::link;
use crate::builder::lint::lint;
use crate::builder::toolchain::resolve_profile;
use crate::core::errors::ConfigError;
use crate::core::mode::BuildMode;
use crate::core::project::ProjectConfig;
use crate::core::workspace::WorkspaceConfig;
use crate::util::{Shell, Status};

/// Exit status for configuration failures.
pub const EXIT_CONFIG: i32 = -2;
/// Exit status for toolchain, compile, link and lint failures.
pub const EXIT_BUILD: i32 = -3;
/// Exit status for anything unexpected.
pub const EXIT_UNEXPECTED: i32 = -1;

/// Options for a workspace run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Path of the workspace descriptor
    pub workspace: PathBuf,
    /// Build-type token, validated during `Init`
    pub mode: String,
}

/// States of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ResolvingProjects,
    Linting,
    Building,
    Passed,
    Failed,
}

impl RunState {
    /// Whether `next` may follow this state.
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Init, ResolvingProjects)
                | (ResolvingProjects, Linting)
                | (ResolvingProjects, Building)
                | (Linting, Passed)
                | (Building, Passed)
                | (_, Failed)
        ) && !matches!(self, Passed | Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "init",
            RunState::ResolvingProjects => "resolving projects",
            RunState::Linting => "linting",
            RunState::Building => "building",
            RunState::Passed => "passed",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The stage a project failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Link,
    Lint,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compile => "compile",
            Stage::Link => "link",
            Stage::Lint => "lint",
        })
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The toolchain could not be resolved before any project ran.
    #[error(transparent)]
    Toolchain(BuildError),

    #[error("{stage} stage failed for project `{project}`")]
    Stage {
        project: String,
        stage: Stage,
        #[source]
        source: BuildError,
    },
}

impl RunError {
    /// The process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        let build = match self {
            RunError::Config(_) => return EXIT_CONFIG,
            RunError::Toolchain(e) | RunError::Stage { source: e, .. } => e,
        };
        match build {
            BuildError::Io(_) => EXIT_UNEXPECTED,
            _ => EXIT_BUILD,
        }
    }

    /// The failed tool invocation, when the failure came from one.
    pub fn failure(&self) -> Option<&CommandFailure> {
        match self {
            RunError::Stage { source, .. } => source.failure(),
            _ => None,
        }
    }
}

/// A validated workspace, ready to run.
///
/// The plan carries the run state from `Init` onward, so one value tracks a
/// run from parsing the token to its outcome.
#[derive(Debug, Clone)]
pub struct WorkspacePlan {
    pub workspace: WorkspaceConfig,
    pub mode: BuildMode,
    /// Projects in build order
    pub projects: Vec<ProjectConfig>,
    run: Run,
}

impl WorkspacePlan {
    /// Current state of the run.
    pub fn state(&self) -> RunState {
        self.run.state
    }
}

/// Outcome of a passed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub mode: BuildMode,
    pub projects: usize,
    /// Artifacts in build order (empty for lint runs)
    pub artifacts: Vec<PathBuf>,
    /// Files formatted (zero for build runs)
    pub formatted: usize,
    /// Every state the run went through, `Init` first
    pub states: Vec<RunState>,
}

/// Tracks the run state and logs every transition.
#[derive(Debug, Clone)]
struct Run {
    state: RunState,
    history: Vec<RunState>,
}

impl Run {
    fn new() -> Self {
        tracing::debug!("run state: {}", RunState::Init);
        Run {
            state: RunState::Init,
            history: vec![RunState::Init],
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("run state: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    /// Record the outcome of the current state.
    fn settle<T>(&mut self, result: Result<T, RunError>) -> Result<T, RunError> {
        match &result {
            Ok(_) => self.advance(RunState::Passed),
            Err(_) => self.advance(RunState::Failed),
        }
        result
    }
}

/// Run a workspace end to end with the host toolchain.
pub fn build_workspace(opts: &BuildOptions, shell: Arc<Shell>) -> Result<BuildSummary, RunError> {
    let mut plan = prepare(&opts.workspace, &opts.mode)?;

    let profile = match resolve_profile(plan.mode, plan.workspace.root()) {
        Ok(profile) => profile,
        Err(e) => {
            plan.run.advance(RunState::Failed);
            return Err(RunError::Toolchain(e));
        }
    };
    let ctx = BuildContext::new(profile, plan.workspace.root(), shell);

    execute(&ctx, plan)
}

/// `Init` and `ResolvingProjects`: validate the token and every descriptor.
pub fn prepare(workspace: &Path, mode: &str) -> Result<WorkspacePlan, RunError> {
    let mut run = Run::new();

    match load_plan(workspace, mode, &mut run) {
        Ok((workspace, mode, projects)) => Ok(WorkspacePlan {
            workspace,
            mode,
            projects,
            run,
        }),
        Err(e) => {
            run.advance(RunState::Failed);
            Err(e)
        }
    }
}

fn load_plan(
    workspace: &Path,
    mode: &str,
    run: &mut Run,
) -> Result<(WorkspaceConfig, BuildMode, Vec<ProjectConfig>), RunError> {
    let mode: BuildMode = mode.parse()?;
    let workspace = WorkspaceConfig::load(workspace)?;

    run.advance(RunState::ResolvingProjects);
    let projects = workspace
        .project_order()
        .iter()
        .map(|r| ProjectConfig::load(r, workspace.root()))
        .collect::<Result<Vec<_>, _>>()?;

    validate_dependency_order(&projects)?;

    Ok((workspace, mode, projects))
}

/// A dependency naming a sibling must name one built earlier.
///
/// Names matching no sibling are external libraries and are not checked.
pub fn validate_dependency_order(projects: &[ProjectConfig]) -> Result<(), ConfigError> {
    for (index, project) in projects.iter().enumerate() {
        for dependency in &project.depends_on {
            let sibling = projects.iter().position(|p| p.answers_to(dependency));
            if matches!(sibling, Some(pos) if pos >= index) {
                return Err(ConfigError::DependencyOrder {
                    project: project.key.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
    Ok(())
}

/// `Linting` or `Building`, then `Passed` or `Failed`.
pub fn execute(ctx: &BuildContext, mut plan: WorkspacePlan) -> Result<BuildSummary, RunError> {
    let result = if plan.mode.is_lint() {
        plan.run.advance(RunState::Linting);
        lint_all(ctx, &plan)
    } else {
        plan.run.advance(RunState::Building);
        build_all(ctx, &plan)
    };

    plan.run.settle(result).map(|summary| BuildSummary {
        states: plan.run.history.clone(),
        ..summary
    })
}

fn lint_all(ctx: &BuildContext, plan: &WorkspacePlan) -> Result<BuildSummary, RunError> {
    let mut formatted = 0;
    for project in &plan.projects {
        formatted += lint(ctx, project).map_err(|source| RunError::Stage {
            project: project.name.clone(),
            stage: Stage::Lint,
            source,
        })?;
    }

    ctx.shell.status(
        Status::Finished,
        format!("lint of {} file(s)", formatted),
    );

    Ok(BuildSummary {
        mode: plan.mode,
        projects: plan.projects.len(),
        artifacts: Vec::new(),
        formatted,
        states: Vec::new(),
    })
}

fn build_all(ctx: &BuildContext, plan: &WorkspacePlan) -> Result<BuildSummary, RunError> {
    let mut artifacts = Vec::with_capacity(plan.projects.len());

    for (index, project) in plan.projects.iter().enumerate() {
        let stage_error = |stage: Stage| {
            let project = project.name.clone();
            move |source| RunError::Stage {
                project,
                stage,
                source,
            }
        };

        let dirs = include_dirs(
            &ctx.profile,
            &ctx.workspace_root,
            project,
            &plan.projects[..index],
        );
        let objects = compile_project(ctx, project, &dirs).map_err(stage_error(Stage::Compile))?;
        artifacts.push(link(ctx, project, &objects).map_err(stage_error(Stage::Link))?);
    }

    ctx.shell.status(
        Status::Finished,
        format!("{} build of {} project(s)", plan.mode, plan.projects.len()),
    );

    Ok(BuildSummary {
        mode: plan.mode,
        projects: plan.projects.len(),
        artifacts,
        formatted: 0,
        states: Vec::new(),
    })
}
