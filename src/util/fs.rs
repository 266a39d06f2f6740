//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Find files in `base` matching a glob pattern, ignoring case.
///
/// Results are sorted. A missing `base` matches nothing.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let full_pattern = base.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let mut results = Vec::new();
    for entry in glob_with(&pattern_str, options)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Copy every file in `src` matching `pattern` into `dst`, returning the
/// copied destinations.
pub fn copy_matching(src: &Path, dst: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for path in glob_files(src, pattern)? {
        if let Some(name) = path.file_name() {
            ensure_dir(dst)?;
            let target = dst.join(name);
            fs::copy(&path, &target).with_context(|| {
                format!("failed to copy {} to {}", path.display(), target.display())
            })?;
            copied.push(target);
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("main.o"), "").unwrap();
        fs::write(src.join("nested").join("util.o"), "").unwrap();
        fs::write(src.join("readme.txt"), "readme").unwrap();

        let files = glob_files(tmp.path(), "src/**/*.o").unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_copy_matching_ignores_case() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("deps");
        let dst = tmp.path().join("out");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("sfml.DLL"), "a").unwrap();
        fs::write(src.join("zlib.dll"), "b").unwrap();
        fs::write(src.join("zlib.lib"), "c").unwrap();

        let copied = copy_matching(&src, &dst, "*.dll").unwrap();
        assert_eq!(copied, vec![dst.join("sfml.DLL"), dst.join("zlib.dll")]);
        assert!(!dst.join("zlib.lib").exists());
    }

    #[test]
    fn test_copy_from_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let copied =
            copy_matching(&tmp.path().join("nope"), &tmp.path().join("out"), "*.dll").unwrap();
        assert!(copied.is_empty());
        assert!(!tmp.path().join("out").exists());
    }
}
