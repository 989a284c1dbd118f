//! Language registry: the table of capability records.
//!
//! Each record ties a language to the file extensions that select it, the
//! fence that hides C/C++ code from its parser, and the checkers that validate
//! it. Adding a guest language means adding a record, not touching the merger.

use crate::error::PolyglotError;
use crate::fence::{CloseRule, Fence};
use crate::language::Language;
use crate::validator::config::{CheckerDefinition, LanguageCheckers, SuccessPredicate};
use std::path::Path;
use std::sync::LazyLock;

/// Everything the tool knows about one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    pub language: Language,
    /// Extensions including the leading dot, matched case-sensitively.
    pub extensions: Vec<String>,
    /// `None` for C-family hosts, which need no fence.
    pub fence: Option<Fence>,
    pub checkers: LanguageCheckers,
}

/// Registry of language records. Built-ins can be overridden from configuration.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    records: Vec<LanguageRecord>,
}

impl LanguageRegistry {
    /// Create a registry from explicit records.
    pub fn new(records: Vec<LanguageRecord>) -> Self {
        Self { records }
    }

    /// Map an extension to a language. An extension lives in at most one record.
    pub fn with_extension(mut self, extension: &str, language: Language) -> Self {
        for record in &mut self.records {
            record.extensions.retain(|e| e != extension);
        }
        if let Some(record) = self.record_mut(language) {
            record.extensions.push(extension.to_string());
        }
        self
    }

    /// Replace the checkers of a language.
    pub fn with_checkers(mut self, language: Language, checkers: LanguageCheckers) -> Self {
        if let Some(record) = self.record_mut(language) {
            record.checkers = checkers;
        }
        self
    }

    pub fn records(&self) -> &[LanguageRecord] {
        &self.records
    }

    pub fn record(&self, language: Language) -> Option<&LanguageRecord> {
        self.records.iter().find(|r| r.language == language)
    }

    fn record_mut(&mut self, language: Language) -> Option<&mut LanguageRecord> {
        self.records.iter_mut().find(|r| r.language == language)
    }

    /// Look up an extension such as `.py`.
    pub fn language_for_extension(&self, extension: &str) -> Option<Language> {
        self.records
            .iter()
            .find(|r| r.extensions.iter().any(|e| e == extension))
            .map(|r| r.language)
    }

    /// Resolve a file path to its language by extension.
    pub fn language_for_path(&self, path: &Path) -> Result<Language, PolyglotError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        self.language_for_extension(&extension)
            .ok_or_else(|| PolyglotError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            })
    }

    /// Fence for a guest language; `None` for hosts or unfenced records.
    pub fn fence(&self, language: Language) -> Option<&Fence> {
        self.record(language).and_then(|r| r.fence.as_ref())
    }

    /// Which guest language opens its fence with this exact line.
    pub fn language_for_open_fence(&self, line: &str) -> Option<Language> {
        self.records
            .iter()
            .find(|r| r.fence.as_ref().is_some_and(|f| f.open == line))
            .map(|r| r.language)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new(BUILTIN_RECORDS.clone())
    }
}

fn quiet(command: &[&str]) -> CheckerDefinition {
    CheckerDefinition::new(command, SuccessPredicate::Quiet)
}

fn marker(command: &[&str], marker: &str) -> CheckerDefinition {
    CheckerDefinition::new(command, SuccessPredicate::Marker(marker.to_string()))
}

fn extensions(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Compiles in memory. `py_compile` would write `__pycache__` next to the input.
pub const PYTHON_COMPILE: &str = "import sys; compile(open(sys.argv[1], 'rb').read(), sys.argv[1], 'exec')";

/// Built-in language records.
static BUILTIN_RECORDS: LazyLock<Vec<LanguageRecord>> = LazyLock::new(|| {
    vec![
        LanguageRecord {
            language: Language::Cpp,
            extensions: extensions(&[".cpp", ".cc", ".cxx", ".c++"]),
            fence: None,
            checkers: LanguageCheckers {
                gate: vec![quiet(&["g++", "-fsyntax-only", "{file}"])],
                advisory: vec![],
            },
        },
        LanguageRecord {
            language: Language::C,
            extensions: extensions(&[".c"]),
            fence: None,
            checkers: LanguageCheckers {
                gate: vec![quiet(&["g++", "-fsyntax-only", "-x", "c", "{file}"])],
                advisory: vec![],
            },
        },
        // Raw string so backslashes in the C++ code are not escapes
        LanguageRecord {
            language: Language::Python,
            extensions: extensions(&[".py"]),
            fence: Some(Fence::new("r'''", "'''", "'''", CloseRule::Anywhere)),
            checkers: LanguageCheckers {
                gate: vec![
                    quiet(&["python3", "-c", PYTHON_COMPILE, "{file}"]),
                    quiet(&["python", "-c", PYTHON_COMPILE, "{file}"]),
                ],
                advisory: vec![quiet(&["pyflakes", "{file}"])],
            },
        },
        LanguageRecord {
            language: Language::Ruby,
            extensions: extensions(&[".rb"]),
            fence: Some(Fence::new("=begin", "=end", "=end", CloseRule::LineStart)),
            checkers: LanguageCheckers {
                gate: vec![marker(&["ruby", "-c", "{file}"], "Syntax OK")],
                advisory: vec![],
            },
        },
        // `:` is the no-op builtin, the quoted argument swallows the C++ code
        LanguageRecord {
            language: Language::Shell,
            extensions: extensions(&[".sh", ".bash"]),
            fence: Some(Fence::new(": '", "'", "'", CloseRule::Anywhere)),
            checkers: LanguageCheckers {
                gate: vec![quiet(&["bash", "-n", "{file}"])],
                advisory: vec![],
            },
        },
        LanguageRecord {
            language: Language::Perl,
            extensions: extensions(&[".pl"]),
            fence: Some(Fence::new("=pod", "=cut", "=cut", CloseRule::LineStart)),
            checkers: LanguageCheckers {
                gate: vec![marker(&["perl", "-c", "{file}"], "syntax OK")],
                advisory: vec![],
            },
        },
    ]
});
