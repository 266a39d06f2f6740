//! Project descriptors (`project.ini` + `assets.ini`).
//!
//! A project lives in its own directory and produces exactly one artifact.
//! The project descriptor holds build settings; the asset manifest is only
//! validated here (schema version) and consumed by other tools.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::errors::ConfigError;
use crate::core::ini::{split_list, IniDocument};
use crate::core::language::Language;
use crate::core::workspace::{check_schema, ProjectRef};

/// File name of the project descriptor.
pub const PROJECT_DESCRIPTOR: &str = "project.ini";

/// File name of the asset manifest.
pub const ASSET_MANIFEST: &str = "assets.ini";

/// Kind of artifact a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Executable,
    Shared,
    Static,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Executable => "executable",
            OutputKind::Shared => "shared",
            OutputKind::Static => "static",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "executable" => Ok(OutputKind::Executable),
            "shared" => Ok(OutputKind::Shared),
            "static" => Ok(OutputKind::Static),
            other => Err(other.to_string()),
        }
    }
}

/// Resolved configuration of one project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Key from the workspace build order; names the object directory.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Directory holding the descriptors.
    pub root: PathBuf,
    /// Source directory, relative to `root`.
    pub source_dir: PathBuf,
    /// Include directory, relative to `root`.
    pub include_dir: PathBuf,
    /// Languages in declared order, without duplicates.
    pub languages: Vec<Language>,
    pub output_kind: OutputKind,
    /// Artifact base name, without prefix or extension.
    pub output_name: String,
    /// Directory receiving the artifact and the object tree.
    pub output_path: PathBuf,
    /// Library or sibling project names to link against.
    pub depends_on: Vec<String>,
}

impl ProjectConfig {
    /// Load and validate both descriptors of a project.
    ///
    /// `output.path` is resolved against `workspace_root` so sibling projects
    /// can share one output directory.
    pub fn load(project: &ProjectRef, workspace_root: &Path) -> Result<Self, ConfigError> {
        let project_path = project.dir.join(PROJECT_DESCRIPTOR);
        let assets_path = project.dir.join(ASSET_MANIFEST);

        for path in [&project_path, &assets_path] {
            if !path.is_file() {
                return Err(ConfigError::Missing { path: path.clone() });
            }
        }

        let doc = IniDocument::load(&project_path)?;
        let assets = IniDocument::load(&assets_path)?;

        check_schema(&project_path, &doc)?;
        check_schema(&assets_path, &assets)?;

        Self::from_document(project, workspace_root, &project_path, &doc)
    }

    fn from_document(
        project: &ProjectRef,
        workspace_root: &Path,
        path: &Path,
        doc: &IniDocument,
    ) -> Result<Self, ConfigError> {
        let required = |section: &str, key: &str| -> Result<String, ConfigError> {
            doc.get(section, key)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingKey {
                    path: path.to_path_buf(),
                    section: section.to_string(),
                    key: key.to_string(),
                })
        };

        let source_dir = PathBuf::from(required("source", "sourcedir")?);
        let include_dir = PathBuf::from(required("source", "includedir")?);

        let mut languages = Vec::new();
        for item in split_list(&required("source", "langs")?) {
            let lang: Language = item.parse().map_err(|_| ConfigError::UnknownLanguage {
                path: path.to_path_buf(),
                value: item.clone(),
            })?;
            if !languages.contains(&lang) {
                languages.push(lang);
            }
        }
        if languages.is_empty() {
            return Err(ConfigError::NoLanguages {
                path: path.to_path_buf(),
            });
        }

        let kind_value = required("output", "type")?;
        let output_kind: OutputKind =
            kind_value
                .parse()
                .map_err(|_| ConfigError::InvalidOutputKind {
                    path: path.to_path_buf(),
                    value: kind_value.clone(),
                })?;

        let output_name = required("output", "name")?;
        let output_path = workspace_root.join(required("output", "path")?);

        let depends_on = doc.get("", "depends").map(split_list).unwrap_or_default();

        let name = doc
            .get("", "name")
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| project.key.clone());

        Ok(ProjectConfig {
            key: project.key.clone(),
            name,
            root: project.dir.clone(),
            source_dir,
            include_dir,
            languages,
            output_kind,
            output_name,
            output_path,
            depends_on,
        })
    }

    /// Absolute (or workspace-relative) source root.
    pub fn source_root(&self) -> PathBuf {
        self.root.join(&self.source_dir)
    }

    /// Absolute (or workspace-relative) include root.
    pub fn include_root(&self) -> PathBuf {
        self.root.join(&self.include_dir)
    }

    /// Root of this project's object buckets: `<output>/code/<key>`.
    pub fn object_dir(&self) -> PathBuf {
        self.output_path.join("code").join(&self.key)
    }

    /// Whether `name` refers to this project, by key or by output name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name) || self.output_name == name
    }
}
