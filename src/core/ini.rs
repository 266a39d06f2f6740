//! Section/key-value descriptor parsing.
//!
//! Workspace, project and asset descriptors all share one small INI dialect:
//!
//! ```text
//! # comment
//! version=0
//! order=engine,game
//!
//! [projects]
//! engine=src/engine
//! ```
//!
//! Keys before the first section header belong to the unnamed section `""`.
//! Section names and keys are case-folded; values are kept as written.
//! Every malformed line is collected so a broken file is reported in one go.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::core::errors::ConfigError;

/// A line that could not be parsed, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLine {
    pub number: usize,
    pub text: String,
}

impl fmt::Display for BadLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.number, self.text)
    }
}

/// Aggregate parse failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IniError {
    #[error("malformed syntax on {} line(s)", lines.len())]
    Malformed { lines: Vec<BadLine> },
}

/// A parsed descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    /// Parse descriptor text.
    pub fn parse(text: &str) -> Result<Self, IniError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        sections.insert(String::new(), BTreeMap::new());

        let mut current = String::new();
        let mut bad = Vec::new();

        for (idx, raw) in text.split('\n').enumerate() {
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                match rest.strip_suffix(']') {
                    Some(name) => {
                        current = name.trim().to_lowercase();
                        sections.entry(current.clone()).or_default();
                    }
                    None => bad.push(BadLine {
                        number: idx + 1,
                        text: line.to_string(),
                    }),
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                bad.push(BadLine {
                    number: idx + 1,
                    text: line.to_string(),
                });
                continue;
            };

            let key = key.trim().to_lowercase();
            let section = sections.entry(current.clone()).or_default();
            if key.is_empty() || section.contains_key(&key) {
                bad.push(BadLine {
                    number: idx + 1,
                    text: line.to_string(),
                });
                continue;
            }
            section.insert(key, value.trim().to_string());
        }

        if !bad.is_empty() {
            return Err(IniError::Malformed { lines: bad });
        }

        Ok(IniDocument { sections })
    }

    /// Read and parse a descriptor file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        IniDocument::parse(&text).map_err(|IniError::Malformed { lines }| ConfigError::Malformed {
            path: path.to_path_buf(),
            lines,
        })
    }

    /// Look up a value. Section and key are matched case-insensitively.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_lowercase())
            .and_then(|s| s.get(&key.to_lowercase()))
            .map(String::as_str)
    }
}

/// Split a comma-delimited property into trimmed, non-empty items.
///
/// A value without a comma is a one-element list.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
