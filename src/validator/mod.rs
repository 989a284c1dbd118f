//! Syntax validation of the two inputs using each language's own toolchain.
//!
//! The merger only needs a pass/fail signal and the diagnostic text. This
//! module produces both by running external checkers in syntax-only mode:
//!
//! - **Gate checkers** decide. They are tried in order and the first one that
//!   is installed runs (Python falls back from `python3` to `python`).
//! - **Advisory checkers** (linters such as pyflakes) only run once the gate
//!   passed; their findings are reported but never block the merge.
//!
//! Checkers are configured per language in `.polyglot.toml`:
//!
//! ```toml
//! [checkers.python]
//! gate = [{ command = ["python3.12", "-c", "import ast, sys; ast.parse(open(sys.argv[1]).read())", "{file}"] }]
//! advisory = [{ command = ["ruff", "check", "{file}"] }]
//!
//! [checkers.ruby]
//! gate = [{ command = ["ruby", "-c", "{file}"], success = { marker = "Syntax OK" } }]
//! ```

pub mod config;
pub mod executor;

pub use config::{CheckerDefinition, LanguageCheckers, SuccessPredicate};
pub use executor::{CheckExecutor, CheckOutput, ExecutorError};

use crate::language::Language;
use crate::registry::LanguageRegistry;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Outcome of validating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Whether the gate checker accepted the file.
    pub ok: bool,
    /// Gate checker output, verbatim.
    pub diagnostic: String,
    /// Command line of the gate checker that decided.
    pub checker: String,
    /// Findings from advisory checkers.
    pub advisories: Vec<Advisory>,
}

/// Output of an advisory checker that did not come back clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub tool: String,
    pub output: String,
}

/// Validation could not be performed at all.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("No syntax checker configured for {language}")]
    NoChecker { language: Language },

    #[error("No syntax checker for {language} is installed (tried {})", tried.join(", "))]
    ToolNotFound { language: Language, tried: Vec<String> },

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Anything that can tell whether a file parses in its own language.
pub trait SyntaxValidator: Sync {
    fn validate(&self, path: &Path, language: Language) -> Result<Validation, ValidatorError>;
}

/// Validator backed by external compilers and interpreters.
pub struct ToolchainValidator {
    checkers: HashMap<Language, LanguageCheckers>,
    executor: CheckExecutor,
    advisory: bool,
}

impl ToolchainValidator {
    /// Build a validator from the checker sets of every registered language.
    pub fn from_registry(registry: &LanguageRegistry, timeout_ms: u64, advisory: bool) -> Self {
        let checkers = registry
            .records()
            .iter()
            .map(|record| (record.language, record.checkers.clone()))
            .collect();

        Self {
            checkers,
            executor: CheckExecutor::new(timeout_ms),
            advisory,
        }
    }

    fn run_advisories(&self, checkers: &LanguageCheckers, path: &Path) -> Vec<Advisory> {
        let mut advisories = Vec::new();

        for checker in &checkers.advisory {
            match self.executor.run(checker, path) {
                Ok(output) => {
                    let combined = output.combined();
                    if !checker.success.accepts(output.success, &combined) {
                        advisories.push(Advisory {
                            tool: checker.display_command(),
                            output: combined,
                        });
                    }
                }
                Err(ExecutorError::ToolNotFound { tool }) => {
                    log::debug!("[polyglot-validate] advisory checker '{tool}' not installed, skipping");
                }
                Err(e) => {
                    log::warn!("Advisory checker '{}' could not run: {e}", checker.display_command());
                }
            }
        }

        advisories
    }
}

impl SyntaxValidator for ToolchainValidator {
    fn validate(&self, path: &Path, language: Language) -> Result<Validation, ValidatorError> {
        let checkers = self
            .checkers
            .get(&language)
            .filter(|c| !c.gate.is_empty())
            .ok_or(ValidatorError::NoChecker { language })?;

        let mut tried = Vec::new();
        for checker in &checkers.gate {
            let output = match self.executor.run(checker, path) {
                Ok(output) => output,
                Err(ExecutorError::ToolNotFound { tool }) => {
                    log::debug!("[polyglot-validate] '{tool}' not installed, trying next {language} checker");
                    tried.push(tool);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let diagnostic = output.combined();
            let ok = checker.success.accepts(output.success, &diagnostic);
            log::info!(
                "Checked {} with `{}`: {}",
                path.display(),
                checker.display_command(),
                if ok { "OK" } else { "errors" }
            );

            let advisories = if ok && self.advisory {
                self.run_advisories(checkers, path)
            } else {
                Vec::new()
            };

            return Ok(Validation {
                ok,
                diagnostic,
                checker: checker.display_command(),
                advisories,
            });
        }

        Err(ValidatorError::ToolNotFound { language, tried })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator_with(language: Language, checkers: LanguageCheckers) -> ToolchainValidator {
        let registry = LanguageRegistry::default().with_checkers(language, checkers);
        ToolchainValidator::from_registry(&registry, 5_000, true)
    }

    #[test]
    fn test_no_gate_checker() {
        let validator = validator_with(Language::Ruby, LanguageCheckers::default());
        let result = validator.validate(Path::new("a.rb"), Language::Ruby);
        assert!(matches!(result, Err(ValidatorError::NoChecker { language: Language::Ruby })));
    }

    #[test]
    fn test_all_gate_tools_missing() {
        let checkers = LanguageCheckers {
            gate: vec![
                CheckerDefinition::new(&["missing-python-xyz", "-m", "py_compile"], SuccessPredicate::Quiet),
                CheckerDefinition::new(&["missing-python-abc", "-m", "py_compile"], SuccessPredicate::Quiet),
            ],
            advisory: vec![],
        };
        let validator = validator_with(Language::Python, checkers);

        match validator.validate(Path::new("b.py"), Language::Python) {
            Err(ValidatorError::ToolNotFound { language, tried }) => {
                assert_eq!(language, Language::Python);
                assert_eq!(tried, vec!["missing-python-xyz", "missing-python-abc"]);
            }
            other => panic!("Expected ToolNotFound, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_gate_falls_back_to_next_installed_checker() {
        let checkers = LanguageCheckers {
            gate: vec![
                CheckerDefinition::new(&["missing-python-xyz"], SuccessPredicate::Quiet),
                CheckerDefinition::new(&["true"], SuccessPredicate::Quiet),
            ],
            advisory: vec![],
        };
        let validator = validator_with(Language::Python, checkers);

        let validation = validator.validate(Path::new("b.py"), Language::Python).unwrap();
        assert!(validation.ok);
        assert_eq!(validation.checker, "true");
    }

    #[test]
    #[cfg(unix)]
    fn test_gate_failure_keeps_diagnostic_verbatim() {
        let checkers = LanguageCheckers {
            gate: vec![CheckerDefinition::new(
                &["sh", "-c", "echo \"$1:1: expected '}'\" >&2; exit 1", "sh"],
                SuccessPredicate::Quiet,
            )],
            advisory: vec![],
        };
        let validator = validator_with(Language::Cpp, checkers);

        let validation = validator.validate(Path::new("a.cpp"), Language::Cpp).unwrap();
        assert!(!validation.ok);
        assert_eq!(validation.diagnostic, "a.cpp:1: expected '}'\n");
        assert!(validation.advisories.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_advisory_output_does_not_fail_gate() {
        let checkers = LanguageCheckers {
            gate: vec![CheckerDefinition::new(&["true"], SuccessPredicate::Quiet)],
            advisory: vec![
                CheckerDefinition::new(&["sh", "-c", "echo \"$1: unused import\"", "sh"], SuccessPredicate::Quiet),
                CheckerDefinition::new(&["missing-linter-xyz"], SuccessPredicate::Quiet),
            ],
        };
        let validator = validator_with(Language::Python, checkers);

        let validation = validator.validate(Path::new("b.py"), Language::Python).unwrap();
        assert!(validation.ok);
        assert_eq!(validation.advisories.len(), 1);
        assert_eq!(validation.advisories[0].output, "b.py: unused import\n");
    }
}
