//! The polyglot merger.
//!
//! A merged file has four parts:
//!
//! ```text
//! #if 0
//! <fence-open>        guest parser starts ignoring text here
//! #endif
//! <host lines>        the only live text for the C preprocessor
//! #if 0
//! <fence-close>       guest parser resumes here
//! #endif
//! #if 0
//! <guest lines>       live for the guest, dead for the C preprocessor
//! #endif
//! ```
//!
//! Every guest language treats `#` lines as comments, so the guest parser sees
//! an inert fenced region followed by its own source. The C preprocessor drops
//! all three `#if 0` groups and compiles the host lines unchanged.

use crate::document::SourceDocument;
use crate::error::{InputSlot, PolyglotError};
use crate::fence::{Fence, FenceCollision, find_collisions};
use crate::language::Language;
use crate::registry::LanguageRegistry;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const IF_ZERO: &str = "#if 0";
pub const ENDIF: &str = "#endif";
pub const LINE_TERMINATOR: &str = "\n";

/// Which input is the host and which is the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub host: Language,
    pub guest: Language,
    pub host_slot: InputSlot,
}

impl Pairing {
    pub fn guest_slot(&self) -> InputSlot {
        match self.host_slot {
            InputSlot::First => InputSlot::Second,
            InputSlot::Second => InputSlot::First,
        }
    }

    /// Reorder a (first, second) pair of values into (host, guest).
    pub fn host_guest<T>(&self, first: T, second: T) -> (T, T) {
        match self.host_slot {
            InputSlot::First => (first, second),
            InputSlot::Second => (second, first),
        }
    }
}

/// Decide host and guest from the two inputs' languages, in either order.
pub fn pair(first: Language, second: Language) -> Result<Pairing, PolyglotError> {
    match (first.is_c_family(), second.is_c_family()) {
        (true, false) => Ok(Pairing {
            host: first,
            guest: second,
            host_slot: InputSlot::First,
        }),
        (false, true) => Ok(Pairing {
            host: second,
            guest: first,
            host_slot: InputSlot::Second,
        }),
        _ => Err(PolyglotError::InvalidPairing { first, second }),
    }
}

/// The merged output, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    lines: Vec<String>,
}

impl MergedDocument {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full file contents, `\n`-terminated on every platform.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push_str(LINE_TERMINATOR);
        }
        out
    }

    /// Replace whatever is at `path` with the merged file.
    ///
    /// The contents go to a temporary file in the same directory, which is then
    /// renamed over `path`, so a failed write never leaves a partial output.
    pub fn write_to(&self, path: &Path) -> Result<(), PolyglotError> {
        let io_error = |e: std::io::Error| PolyglotError::io(path, e);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".polyglot-").suffix(".tmp");
        if let Some(permissions) = output_permissions(path) {
            builder.permissions(permissions);
        }

        let mut file = builder.tempfile_in(dir).map_err(io_error)?;
        file.write_all(self.render().as_bytes()).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(path).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}

/// Permissions for the output: those of the file being replaced, else the
/// usual mode for a new source file.
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    if let Ok(metadata) = fs::metadata(path) {
        return Some(metadata.permissions());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Builds merged documents from registry fences.
pub struct Merger<'a> {
    registry: &'a LanguageRegistry,
}

impl<'a> Merger<'a> {
    pub fn new(registry: &'a LanguageRegistry) -> Self {
        Self { registry }
    }

    fn check_roles(host: &SourceDocument, guest: &SourceDocument) -> Result<(), PolyglotError> {
        if host.language.is_c_family() && !guest.language.is_c_family() {
            Ok(())
        } else {
            Err(PolyglotError::InvalidPairing {
                first: host.language,
                second: guest.language,
            })
        }
    }

    /// The guest's fence, or `NoFence` when the registry has none.
    pub fn fence_for(&self, guest: Language) -> Result<&'a Fence, PolyglotError> {
        self.registry
            .fence(guest)
            .ok_or(PolyglotError::NoFence { language: guest })
    }

    /// Lines that would break either parser once merged.
    pub fn collisions(
        &self,
        host: &SourceDocument,
        guest: &SourceDocument,
    ) -> Result<Vec<FenceCollision>, PolyglotError> {
        Self::check_roles(host, guest)?;
        let fence = self.fence_for(guest.language)?;
        Ok(find_collisions(&host.lines, &guest.lines, fence))
    }

    pub fn merge(&self, host: &SourceDocument, guest: &SourceDocument) -> Result<MergedDocument, PolyglotError> {
        Self::check_roles(host, guest)?;
        let fence = self.fence_for(guest.language)?;

        let mut lines = Vec::with_capacity(host.lines.len() + guest.lines.len() + 8);
        lines.extend([IF_ZERO, fence.open.as_str(), ENDIF].map(str::to_string));
        lines.extend(host.lines.iter().cloned());
        lines.extend([IF_ZERO, fence.close.as_str(), ENDIF].map(str::to_string));
        lines.push(IF_ZERO.to_string());
        lines.extend(guest.lines.iter().cloned());
        lines.push(ENDIF.to_string());

        log::debug!(
            "[polyglot-merge] {} ({}) + {} ({}) -> {} lines",
            host.path.display(),
            host.language,
            guest.path.display(),
            guest.language,
            lines.len()
        );

        Ok(MergedDocument { lines })
    }
}

/// Sources recovered from a merged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub guest_language: Language,
    pub host: Vec<String>,
    pub guest: Vec<String>,
}

/// Recover host and guest sources from a file produced by [`Merger::merge`].
///
/// The host ends at the first fence-close separator, so this is exact for any
/// merge without host-side fence collisions.
pub fn extract(text: &str, registry: &LanguageRegistry) -> Result<Extracted, PolyglotError> {
    let malformed = |reason: &str| PolyglotError::MalformedPolyglot {
        reason: reason.to_string(),
    };

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 7 || lines[0] != IF_ZERO || lines[2] != ENDIF {
        return Err(malformed("missing `#if 0` fence header"));
    }

    let guest_language = registry
        .language_for_open_fence(lines[1])
        .ok_or_else(|| malformed(&format!("unknown fence opener {:?}", lines[1])))?;
    let fence = registry
        .fence(guest_language)
        .ok_or(PolyglotError::NoFence { language: guest_language })?;

    if lines.last() != Some(&ENDIF) {
        return Err(malformed("file does not end with `#endif`"));
    }

    let body = &lines[3..lines.len() - 1];
    let separator = [IF_ZERO, fence.close.as_str(), ENDIF, IF_ZERO];
    let split = body
        .windows(separator.len())
        .position(|window| window == separator)
        .ok_or_else(|| malformed(&format!("no `{}` fence-close block found", fence.close)))?;

    let to_owned = |slice: &[&str]| slice.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Ok(Extracted {
        guest_language,
        host: to_owned(&body[..split]),
        guest: to_owned(&body[split + separator.len()..]),
    })
}
