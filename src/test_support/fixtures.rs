//! Descriptor trees on disk for orchestrator tests.

use std::path::{Path, PathBuf};

/// One project directory: descriptors plus source files.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    pub key: String,
    pub kind: String,
    pub langs: String,
    pub depends: Option<String>,
    pub version: u32,
    pub asset_version: u32,
    pub sources: Vec<(String, String)>,
}

impl ProjectFixture {
    pub fn new(key: &str, kind: &str, langs: &str) -> Self {
        ProjectFixture {
            key: key.to_string(),
            kind: kind.to_string(),
            langs: langs.to_string(),
            depends: None,
            version: 0,
            asset_version: 0,
            sources: Vec::new(),
        }
    }

    pub fn depends(mut self, depends: &str) -> Self {
        self.depends = Some(depends.to_string());
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Add a file below the project's `src` directory.
    pub fn source(mut self, path: &str, content: &str) -> Self {
        self.sources.push((path.to_string(), content.to_string()));
        self
    }

    /// `project.ini` contents: sources in `src`, headers in `include`,
    /// artifacts in the shared `build` directory.
    pub fn descriptor(&self) -> String {
        let mut text = format!("version={}\n", self.version);
        if let Some(depends) = &self.depends {
            text.push_str(&format!("depends={}\n", depends));
        }
        text.push_str(&format!(
            "\n[source]\nsourcedir=src\nincludedir=include\nlangs={}\n\n\
             [output]\ntype={}\nname={}\npath=build\n",
            self.langs, self.kind, self.key
        ));
        text
    }

    fn write_to(&self, root: &Path) -> std::io::Result<()> {
        let dir = root.join(&self.key);
        std::fs::create_dir_all(dir.join("src"))?;
        std::fs::create_dir_all(dir.join("include"))?;
        std::fs::write(dir.join("project.ini"), self.descriptor())?;
        std::fs::write(
            dir.join("assets.ini"),
            format!("version={}\n", self.asset_version),
        )?;

        for (rel, content) in &self.sources {
            let path = dir.join("src").join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}

/// Write `workspace.ini` and every project below `root`; returns the
/// descriptor path. Projects are built in the given order.
pub fn write_workspace(root: &Path, projects: &[ProjectFixture]) -> std::io::Result<PathBuf> {
    let order: Vec<&str> = projects.iter().map(|p| p.key.as_str()).collect();
    let mut text = format!("version=0\norder={}\n\n[projects]\n", order.join(","));
    for project in projects {
        text.push_str(&format!("{}={}\n", project.key, project.key));
        project.write_to(root)?;
    }

    let path = root.join("workspace.ini");
    std::fs::write(&path, text)?;
    Ok(path)
}

/// A C translation unit that compiles on its own.
pub fn minimal_c_source() -> &'static str {
    "int add(int a, int b) { return a + b; }\n"
}
