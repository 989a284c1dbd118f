//!
//! Error taxonomy for a polyglot run. Every variant is terminal for the
//! current invocation and maps to one process exit code.

use crate::config::ConfigError;
use crate::exit_codes;
use crate::fence::FenceCollision;
use crate::language::Language;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Position of an input on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    First,
    Second,
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSlot::First => f.write_str("input 1"),
            InputSlot::Second => f.write_str("input 2"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PolyglotError {
    #[error("Unsupported file extension {extension:?} for {}", path.display())]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("Invalid pairing: pairing requires one C/C++ file, got {first} and {second}")]
    InvalidPairing { first: Language, second: Language },

    #[error("No fence available for {language}: cannot hide C/C++ code from its parser")]
    NoFence { language: Language },

    #[error("Syntax errors in {} ({language}, {slot}):\n{diagnostic}", path.display())]
    SyntaxFailure {
        slot: InputSlot,
        path: PathBuf,
        language: Language,
        diagnostic: String,
    },

    #[error(
        "Cannot validate {} ({language}, {slot}): tool '{tool}' not found in PATH. \
         Install it, or point [checkers.{}] in .polyglot.toml at an available checker",
        path.display(),
        language.name()
    )]
    ToolMissing {
        slot: InputSlot,
        path: PathBuf,
        language: Language,
        tool: String,
    },

    #[error("Cannot validate {} ({slot}): tool '{tool}' timed out after {timeout_ms}ms", path.display())]
    ToolTimeout {
        slot: InputSlot,
        path: PathBuf,
        tool: String,
        timeout_ms: u64,
    },

    #[error("Cannot validate {} ({slot}): {message}", path.display())]
    ValidatorFailed {
        slot: InputSlot,
        path: PathBuf,
        message: String,
    },

    #[error("{} line(s) would break the {language} fence:\n{}", collisions.len(), format_collisions(collisions))]
    FenceCollision {
        language: Language,
        collisions: Vec<FenceCollision>,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a polyglot produced by this tool: {reason}")]
    MalformedPolyglot { reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn format_collisions(collisions: &[FenceCollision]) -> String {
    collisions
        .iter()
        .map(|c| format!("  {c}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl PolyglotError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PolyglotError::SyntaxFailure { slot, .. } => match slot {
                InputSlot::First => exit_codes::FIRST_INPUT_INVALID,
                InputSlot::Second => exit_codes::SECOND_INPUT_INVALID,
            },
            PolyglotError::UnsupportedExtension { .. }
            | PolyglotError::InvalidPairing { .. }
            | PolyglotError::NoFence { .. }
            | PolyglotError::FenceCollision { .. }
            | PolyglotError::MalformedPolyglot { .. } => exit_codes::UNSUPPORTED_PAIRING,
            PolyglotError::Io { .. } => exit_codes::IO_ERROR,
            PolyglotError::ToolMissing { .. }
            | PolyglotError::ToolTimeout { .. }
            | PolyglotError::ValidatorFailed { .. } => exit_codes::TOOL_UNAVAILABLE,
            PolyglotError::Config(_) => exit_codes::CONFIG_ERROR,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PolyglotError::Io {
            path: path.into(),
            source,
        }
    }
}
