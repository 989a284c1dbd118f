pub mod config;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod fence;
pub mod language;
pub mod merger;
pub mod pipeline;
pub mod registry;
pub mod validator;

pub use crate::config::{OnCollision, PolyglotConfig};
pub use crate::document::SourceDocument;
pub use crate::error::{InputSlot, PolyglotError};
pub use crate::fence::{Fence, FenceCollision};
pub use crate::language::Language;
pub use crate::merger::{Extracted, MergedDocument, Merger, extract, pair};
pub use crate::pipeline::{MergeReport, MergeRequest, Polyglot};
pub use crate::registry::{LanguageRecord, LanguageRegistry};
pub use crate::validator::{SyntaxValidator, ToolchainValidator, Validation};

/// Merge two in-memory sources without validation.
///
/// Inputs may come in either order; exactly one must be C/C++.
pub fn merge_sources(
    first: &SourceDocument,
    second: &SourceDocument,
    registry: &LanguageRegistry,
) -> Result<MergedDocument, PolyglotError> {
    let pairing = pair(first.language, second.language)?;
    let (host, guest) = pairing.host_guest(first, second);
    Merger::new(registry).merge(host, guest)
}
