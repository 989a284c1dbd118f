//!
//! Language tags for the two sides of a polyglot.
//!
//! A polyglot always pairs one C-family *host* (C or C++) with one *guest*
//! language whose parser can be told to skip the host code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language the merger knows how to pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Python,
    Ruby,
    Shell,
    Perl,
}

impl Language {
    /// Every language, hosts first.
    pub const ALL: [Language; 6] = [
        Language::C,
        Language::Cpp,
        Language::Python,
        Language::Ruby,
        Language::Shell,
        Language::Perl,
    ];

    /// Whether this is a C-family language, i.e. one that can host the polyglot.
    pub fn is_c_family(self) -> bool {
        matches!(self, Language::C | Language::Cpp)
    }

    /// Canonical lowercase name, as used in configuration keys.
    pub fn name(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Shell => "shell",
            Language::Perl => "perl",
        }
    }

    /// Human-readable name for messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Python => "Python",
            Language::Ruby => "Ruby",
            Language::Shell => "Shell",
            Language::Perl => "Perl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Parses a canonical name or a common alias (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            "python" | "py" | "python3" => Ok(Language::Python),
            "ruby" | "rb" => Ok(Language::Ruby),
            "shell" | "sh" | "bash" => Ok(Language::Shell),
            "perl" | "pl" => Ok(Language::Perl),
            _ => Err(format!("Unknown language: {s}")),
        }
    }
}
