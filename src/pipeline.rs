//! One merge invocation, end to end.
//!
//! Resolve languages, pair them, validate both inputs, read them, check the
//! fence for collisions, then write the merged file. Nothing touches the
//! output path until every earlier step has passed.

use crate::config::OnCollision;
use crate::document::SourceDocument;
use crate::error::{InputSlot, PolyglotError};
use crate::fence::FenceCollision;
use crate::language::Language;
use crate::merger::{Merger, Pairing, pair};
use crate::registry::LanguageRegistry;
use crate::validator::{Advisory, ExecutorError, SyntaxValidator, Validation, ValidatorError};
use std::fs;
use std::path::{Path, PathBuf};

/// The three paths of a merge, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub first: PathBuf,
    pub second: PathBuf,
    pub output: PathBuf,
}

/// What a successful merge produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub pairing: Pairing,
    pub host: PathBuf,
    pub guest: PathBuf,
    pub output: PathBuf,
    /// Lines written to the output file
    pub lines: usize,
    /// Advisory findings, paired with the file they concern
    pub advisories: Vec<(PathBuf, Advisory)>,
    /// Collisions that were tolerated under `on-collision = "warn"`
    pub collisions: Vec<FenceCollision>,
}

/// Input to validate, tagged with its command-line position.
#[derive(Clone, Copy)]
struct Input<'p> {
    slot: InputSlot,
    path: &'p Path,
    language: Language,
}

/// Drives a merge with a given registry and validator.
pub struct Polyglot<'a> {
    registry: &'a LanguageRegistry,
    validator: &'a dyn SyntaxValidator,
    on_collision: OnCollision,
}

impl<'a> Polyglot<'a> {
    pub fn new(registry: &'a LanguageRegistry, validator: &'a dyn SyntaxValidator) -> Self {
        Self {
            registry,
            validator,
            on_collision: OnCollision::default(),
        }
    }

    pub fn with_on_collision(mut self, on_collision: OnCollision) -> Self {
        self.on_collision = on_collision;
        self
    }

    pub fn run(&self, request: &MergeRequest) -> Result<MergeReport, PolyglotError> {
        let first_language = self.registry.language_for_path(&request.first)?;
        let second_language = self.registry.language_for_path(&request.second)?;
        let pairing = pair(first_language, second_language)?;
        log::debug!(
            "[polyglot-pair] host {} ({}), guest {} ({})",
            pairing.host,
            pairing.host_slot,
            pairing.guest,
            pairing.guest_slot()
        );

        for path in [&request.first, &request.second] {
            fs::metadata(path).map_err(|e| PolyglotError::io(path, e))?;
        }

        let first = Input {
            slot: InputSlot::First,
            path: &request.first,
            language: first_language,
        };
        let second = Input {
            slot: InputSlot::Second,
            path: &request.second,
            language: second_language,
        };
        let (first_validation, second_validation) = self.validate_both(first, second)?;

        let mut advisories = Vec::new();
        for (input, validation) in [(first, first_validation), (second, second_validation)] {
            advisories.extend(
                validation
                    .advisories
                    .into_iter()
                    .map(|advisory| (input.path.to_path_buf(), advisory)),
            );
        }

        let (host_path, guest_path) = pairing.host_guest(&request.first, &request.second);
        let host = SourceDocument::read(host_path, pairing.host)?;
        let guest = SourceDocument::read(guest_path, pairing.guest)?;

        let merger = Merger::new(self.registry);
        let collisions = merger.collisions(&host, &guest)?;
        if !collisions.is_empty() {
            match self.on_collision {
                OnCollision::Fail => {
                    return Err(PolyglotError::FenceCollision {
                        language: pairing.guest,
                        collisions,
                    });
                }
                OnCollision::Warn => {
                    for collision in &collisions {
                        log::warn!("Fence collision ({}): {collision}", pairing.guest);
                    }
                }
            }
        }

        let merged = merger.merge(&host, &guest)?;
        merged.write_to(&request.output)?;
        log::info!("Wrote {} ({} lines)", request.output.display(), merged.lines().len());

        Ok(MergeReport {
            pairing,
            host: host_path.clone(),
            guest: guest_path.clone(),
            output: request.output.clone(),
            lines: merged.lines().len(),
            advisories,
            collisions,
        })
    }

    /// Validate both inputs. Input 1's outcome is examined first either way.
    #[cfg(feature = "parallel")]
    fn validate_both(&self, first: Input<'_>, second: Input<'_>) -> Result<(Validation, Validation), PolyglotError> {
        let (first, second) = rayon::join(|| self.validate(first), || self.validate(second));
        Ok((first?, second?))
    }

    #[cfg(not(feature = "parallel"))]
    fn validate_both(&self, first: Input<'_>, second: Input<'_>) -> Result<(Validation, Validation), PolyglotError> {
        let first = self.validate(first)?;
        Ok((first, self.validate(second)?))
    }

    fn validate(&self, input: Input<'_>) -> Result<Validation, PolyglotError> {
        let validation = self
            .validator
            .validate(input.path, input.language)
            .map_err(|e| validation_error(input, e))?;

        if validation.ok {
            Ok(validation)
        } else {
            Err(PolyglotError::SyntaxFailure {
                slot: input.slot,
                path: input.path.to_path_buf(),
                language: input.language,
                diagnostic: validation.diagnostic,
            })
        }
    }
}

fn validation_error(input: Input<'_>, err: ValidatorError) -> PolyglotError {
    let path = input.path.to_path_buf();
    match err {
        ValidatorError::ToolNotFound { tried, .. } => PolyglotError::ToolMissing {
            slot: input.slot,
            path,
            language: input.language,
            tool: tried.join(", "),
        },
        ValidatorError::Executor(ExecutorError::ToolNotFound { tool }) => PolyglotError::ToolMissing {
            slot: input.slot,
            path,
            language: input.language,
            tool,
        },
        ValidatorError::Executor(ExecutorError::Timeout { tool, timeout_ms }) => PolyglotError::ToolTimeout {
            slot: input.slot,
            path,
            tool,
            timeout_ms,
        },
        other => PolyglotError::ValidatorFailed {
            slot: input.slot,
            path,
            message: other.to_string(),
        },
    }
}
