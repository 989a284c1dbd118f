//! Handler for the `extract` command.

use std::fs;
use std::path::Path;

use polyglot_lib::error::PolyglotError;
use polyglot_lib::merger::extract;
use polyglot_lib::registry::LanguageRegistry;

use super::fail;
use crate::Part;

/// Print the host or guest source recovered from a merged file.
pub fn handle_extract(file: &Path, part: Part, registry: &LanguageRegistry) {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => fail(&PolyglotError::Io {
            path: file.to_path_buf(),
            source: e,
        }),
    };

    let extracted = match extract(&text, registry) {
        Ok(extracted) => extracted,
        Err(e) => fail(&e),
    };
    log::debug!("[polyglot-extract] {} guest: {}", file.display(), extracted.guest_language);

    let lines = match part {
        Part::Host => &extracted.host,
        Part::Guest => &extracted.guest,
    };
    for line in lines {
        println!("{line}");
    }
}
