//! Source discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::language::{extensions_for, Language};

/// D package marker; only the D compiler reads it, and compiling it would
/// collide with other markers in the object tree.
const PACKAGE_MARKER: &str = "package.d";

/// A lazily walked set of source files under one root.
///
/// Every call to [`Sources::iter`] starts a fresh directory walk, so the set
/// reflects the filesystem at the time it is enumerated.
#[derive(Debug, Clone)]
pub struct Sources {
    root: PathBuf,
    extensions: Vec<&'static str>,
    skip_package_markers: bool,
}

/// Files of the selected languages under `source_root`, headers included
/// when `include_headers` is set.
pub fn discover(source_root: &Path, selection: &[Language], include_headers: bool) -> Sources {
    Sources {
        root: source_root.to_path_buf(),
        extensions: extensions_for(selection, include_headers),
        skip_package_markers: false,
    }
}

/// Compilation units of one language: no headers, no package markers.
pub fn compilation_units(source_root: &Path, lang: Language) -> Sources {
    Sources {
        skip_package_markers: lang == Language::D,
        ..discover(source_root, &[lang], false)
    }
}

impl Sources {
    /// Walk the tree. Entries are visited in file-name order within each
    /// directory; unreadable entries are skipped with a warning.
    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable source entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(move |path| self.accepts(path))
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.skip_package_markers && name == PACKAGE_MARKER {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }
}

impl<'a> IntoIterator for &'a Sources {
    type Item = PathBuf;
    type IntoIter = Box<dyn Iterator<Item = PathBuf> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
