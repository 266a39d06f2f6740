//! Workspace descriptor: schema version, build order and project directories.

use std::path::{Path, PathBuf};

use crate::core::errors::ConfigError;
use crate::core::ini::{split_list, IniDocument};

/// Latest descriptor schema version understood by this tool.
pub const SCHEMA_VERSION: u32 = 0;

/// A project entry from the build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    /// Lower-cased key from the `order` list.
    pub key: String,
    /// Directory holding `project.ini` and `assets.ini`.
    pub dir: PathBuf,
}

/// The parsed workspace descriptor.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    path: PathBuf,
    root: PathBuf,
    schema_version: u32,
    project_order: Vec<ProjectRef>,
}

impl WorkspaceConfig {
    /// Load a workspace descriptor from disk.
    ///
    /// Project directories are resolved against the directory containing
    /// the descriptor.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let doc = IniDocument::load(path)?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Self::from_document(path, root, &doc)
    }

    /// Build the configuration from an already parsed descriptor.
    pub fn from_document(path: &Path, root: PathBuf, doc: &IniDocument) -> Result<Self, ConfigError> {
        let schema_version = check_schema(path, doc)?;

        let order = doc.get("", "order").ok_or_else(|| ConfigError::MissingKey {
            path: path.to_path_buf(),
            section: String::new(),
            key: "order".to_string(),
        })?;

        let keys: Vec<String> = split_list(&order.to_lowercase());
        if keys.is_empty() {
            return Err(ConfigError::EmptyOrder {
                path: path.to_path_buf(),
            });
        }

        let mut project_order: Vec<ProjectRef> = Vec::with_capacity(keys.len());
        for key in keys {
            if project_order.iter().any(|p| p.key == key) {
                return Err(ConfigError::DuplicateProject { key });
            }

            let dir = doc
                .get("projects", &key)
                .ok_or_else(|| ConfigError::UnknownProject { key: key.clone() })?;

            project_order.push(ProjectRef {
                dir: root.join(dir.trim()),
                key,
            });
        }

        tracing::debug!(
            "workspace {} declares {} project(s)",
            path.display(),
            project_order.len()
        );

        Ok(WorkspaceConfig {
            path: path.to_path_buf(),
            root,
            schema_version,
            project_order,
        })
    }

    /// Path of the descriptor file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Projects in declared build order.
    pub fn project_order(&self) -> &[ProjectRef] {
        &self.project_order
    }
}

/// Read the `version` key of a descriptor and reject unsupported schemas.
pub(crate) fn check_schema(path: &Path, doc: &IniDocument) -> Result<u32, ConfigError> {
    let value = doc.get("", "version").ok_or_else(|| ConfigError::MissingKey {
        path: path.to_path_buf(),
        section: String::new(),
        key: "version".to_string(),
    })?;

    let version: u32 = value.trim().parse().map_err(|_| ConfigError::InvalidVersion {
        path: path.to_path_buf(),
        value: value.to_string(),
    })?;

    if version > SCHEMA_VERSION {
        return Err(ConfigError::UnsupportedSchema {
            path: path.to_path_buf(),
            version,
            latest: SCHEMA_VERSION,
        });
    }

    Ok(version)
}
