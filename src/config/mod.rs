//!
//! This module defines the `.polyglot.toml` configuration, its errors, and how
//! it is applied to the language registry.
//!
//! ```toml
//! on-collision = "fail"   # or "warn"
//! timeout = 30000         # ms per checker, 0 disables
//! advisory = true         # run advisory linters such as pyflakes
//!
//! [extensions]
//! ".pyw" = "python"
//!
//! [checkers.cpp]
//! gate = [{ command = ["clang++", "-fsyntax-only", "{file}"] }]
//! ```

mod loading;
pub use loading::*;

use crate::language::Language;
use crate::registry::LanguageRegistry;
use crate::validator::config::LanguageCheckers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::str::FromStr;

/// File name looked up in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".polyglot.toml";

/// What to do when a line would break a fence once merged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OnCollision {
    /// Refuse to write the output
    #[default]
    Fail,
    /// Log a warning per collision and write the output anyway
    Warn,
}

impl FromStr for OnCollision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(OnCollision::Fail),
            "warn" => Ok(OnCollision::Warn),
            _ => Err(format!("Unknown on-collision policy: {s}")),
        }
    }
}

impl fmt::Display for OnCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnCollision::Fail => f.write_str("fail"),
            OnCollision::Warn => f.write_str("warn"),
        }
    }
}

/// Contents of `.polyglot.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PolyglotConfig {
    /// Fence collision policy (default: "fail")
    #[serde(default)]
    pub on_collision: OnCollision,

    /// Timeout per checker run in milliseconds, 0 disables (default: 30000)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Run advisory linters after the syntax gate (default: true)
    #[serde(default = "default_true")]
    pub advisory: bool,

    /// Extra extensions, e.g. `".pyw" = "python"`
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,

    /// Per-language checker overrides, keyed by language name
    #[serde(default)]
    pub checkers: BTreeMap<String, LanguageCheckers>,
}

fn default_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl Default for PolyglotConfig {
    fn default() -> Self {
        Self {
            on_collision: OnCollision::default(),
            timeout: default_timeout(),
            advisory: true,
            extensions: BTreeMap::new(),
            checkers: BTreeMap::new(),
        }
    }
}

/// Errors that can occur when loading or applying configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the TOML content
    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: String, message: String },

    /// A key names a language the registry does not know
    #[error("Unknown language '{name}' in [{section}]")]
    UnknownLanguage { name: String, section: &'static str },

    /// Extension keys must include the leading dot
    #[error("Invalid extension '{extension}': extensions must start with '.', e.g. \".py\"")]
    InvalidExtension { extension: String },

    /// A checker without a command
    #[error("Empty checker command in [checkers.{language}]")]
    EmptyCommand { language: String },

    /// Configuration file already exists
    #[error("Configuration file already exists at {path}")]
    FileExists { path: String },
}

impl PolyglotConfig {
    /// Parse TOML content; `path` is only used in error messages.
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Build the registry: built-ins with this configuration's overrides applied.
    pub fn build_registry(&self) -> Result<LanguageRegistry, ConfigError> {
        let mut registry = LanguageRegistry::default();

        for (extension, name) in &self.extensions {
            if !extension.starts_with('.') || extension.len() < 2 {
                return Err(ConfigError::InvalidExtension {
                    extension: extension.clone(),
                });
            }
            let language = parse_language(name, "extensions")?;
            registry = registry.with_extension(extension, language);
        }

        for (name, checkers) in &self.checkers {
            let language = parse_language(name, "checkers")?;
            if checkers
                .gate
                .iter()
                .chain(&checkers.advisory)
                .any(|c| c.command.is_empty())
            {
                return Err(ConfigError::EmptyCommand { language: name.clone() });
            }
            log::debug!("[polyglot-config] overriding checkers for {language}");
            registry = registry.with_checkers(language, checkers.clone());
        }

        Ok(registry)
    }
}

fn parse_language(name: &str, section: &'static str) -> Result<Language, ConfigError> {
    name.parse().map_err(|_| ConfigError::UnknownLanguage {
        name: name.to_string(),
        section,
    })
}
