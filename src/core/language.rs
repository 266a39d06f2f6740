//! Source languages and their file extension sets.

use std::fmt;
use std::str::FromStr;

/// Source language of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    /// C
    C,
    /// C++
    Cxx,
    /// D
    D,
}

impl Language {
    /// All languages, in a stable order.
    pub const ALL: [Language; 3] = [Language::C, Language::Cxx, Language::D];

    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
            Language::D => "d",
        }
    }

    /// Name of the object bucket directory for this language.
    ///
    /// Kept free of characters that are awkward in paths.
    pub fn bucket(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "cpp",
            Language::D => "d",
        }
    }

    /// Extensions of compilation units (without the leading dot).
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::C => &["c"],
            Language::Cxx => &["cc", "cpp", "cxx", "c++"],
            Language::D => &["d"],
        }
    }

    /// Extensions of headers / interface files that belong to this language alone.
    ///
    /// `.h` is shared between C and C++ and handled by [`extensions_for`].
    pub fn header_extensions(&self) -> &'static [&'static str] {
        match self {
            Language::C => &["h"],
            Language::Cxx => &["hh", "hpp", "hxx", "h++"],
            Language::D => &["di"],
        }
    }
}

/// Collect the extensions to search for a selection of languages.
///
/// A C++-only selection with headers also picks up `.h`; when C is selected
/// too, `.h` is attributed to C.
pub fn extensions_for(selection: &[Language], include_headers: bool) -> Vec<&'static str> {
    let mut exts = Vec::new();

    for lang in Language::ALL {
        if !selection.contains(&lang) {
            continue;
        }
        exts.extend_from_slice(lang.source_extensions());
        if include_headers {
            if lang == Language::Cxx && !selection.contains(&Language::C) {
                exts.push("h");
            }
            exts.extend_from_slice(lang.header_extensions());
        }
    }

    exts
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown language name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageParseError(pub String);

impl fmt::Display for LanguageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language '{}', valid values: c, c++, d", self.0)
    }
}

impl std::error::Error for LanguageParseError {}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cpp" | "cxx" => Ok(Language::Cxx),
            "d" => Ok(Language::D),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}
