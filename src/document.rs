//!
//! Source documents: the literal lines of an input file, terminators stripped.

use crate::error::PolyglotError;
use crate::language::Language;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub language: Language,
    /// Lines in file order without `\n` / `\r\n`.
    pub lines: Vec<String>,
}

impl SourceDocument {
    pub fn from_text(path: impl Into<PathBuf>, language: Language, text: &str) -> Self {
        Self {
            path: path.into(),
            language,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Read a whole file. Non-UTF-8 content is an I/O error.
    pub fn read(path: &Path, language: Language) -> Result<Self, PolyglotError> {
        let text = fs::read_to_string(path).map_err(|e| PolyglotError::io(path, e))?;
        log::debug!("[polyglot-read] {} ({language}): {} bytes", path.display(), text.len());
        Ok(Self::from_text(path, language, &text))
    }
}
