//!
//! Fence pairs and collision analysis.
//!
//! A fence is a pair of lines that the guest language's own grammar reads as
//! "ignore everything until the matching close": a raw string literal, a block
//! comment, POD documentation or a quoted argument to a no-op builtin. The
//! merger wraps both fence lines in `#if 0` / `#endif` so the C preprocessor
//! never sees them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directive names that open, continue or close a conditional group.
const CONDITIONAL_OPENERS: &[&str] = &["if", "ifdef", "ifndef"];
const CONDITIONAL_BRANCHES: &[&str] = &["elif", "else", "elifdef", "elifndef"];
const CONDITIONAL_CLOSER: &str = "endif";

/// How a guest parser recognises the close line of its fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CloseRule {
    /// Any occurrence of the close token ends the region (string literals).
    Anywhere,
    /// Only a line beginning with the close token as a whole word ends the
    /// region (`=end`, `=cut`).
    LineStart,
}

/// An (open, close) pair of literal lines for one guest language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct Fence {
    pub open: String,
    pub close: String,
    /// Token whose appearance in host text ends the guest's inert region.
    pub terminator: String,
    pub close_rule: CloseRule,
}

impl Fence {
    pub fn new(open: &str, close: &str, terminator: &str, close_rule: CloseRule) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            terminator: terminator.to_string(),
            close_rule,
        }
    }

    /// Whether the guest parser would leave its inert region at this host line.
    pub fn closes_at(&self, line: &str) -> bool {
        match self.close_rule {
            CloseRule::Anywhere => line.contains(self.terminator.as_str()),
            CloseRule::LineStart => line
                .strip_prefix(self.terminator.as_str())
                .is_some_and(|rest| rest.chars().next().is_none_or(char::is_whitespace)),
        }
    }
}

/// Which input a collision was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Host,
    Guest,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Host => f.write_str("host"),
            Side::Guest => f.write_str("guest"),
        }
    }
}

/// A line that would break one of the two parsers once merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FenceCollision {
    pub side: Side,
    /// 1-indexed line number within the input file.
    pub line: usize,
    pub text: String,
    pub reason: String,
}

impl fmt::Display for FenceCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}: {} ({})", self.side, self.line, self.reason, self.text.trim_end())
    }
}

/// Find every host line that closes the guest fence early and every guest
/// line that would escape the `#if 0` wrapper around the guest copy.
pub fn find_collisions(host: &[String], guest: &[String], fence: &Fence) -> Vec<FenceCollision> {
    let mut collisions: Vec<FenceCollision> = host
        .iter()
        .enumerate()
        .filter(|(_, line)| fence.closes_at(line))
        .map(|(idx, line)| FenceCollision {
            side: Side::Host,
            line: idx + 1,
            text: line.clone(),
            reason: format!("contains the fence terminator `{}`", fence.terminator),
        })
        .collect();

    collisions.extend(skipped_group_collisions(guest));
    collisions
}

/// Extract the directive name from a preprocessor line, if it is one.
fn directive_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

/// A line after backslash-newline splicing.
struct LogicalLine {
    /// 0-indexed physical line it starts on.
    start: usize,
    text: String,
}

/// The line without its trailing backslash. GCC and Clang still splice when
/// whitespace follows the backslash.
fn continuation_body(line: &str) -> Option<&str> {
    line.trim_end().strip_suffix('\\')
}

/// Splice physical lines into logical lines. The second value is the index of
/// the last physical line when it still ends in a continuation.
fn splice_lines(lines: &[String]) -> (Vec<LogicalLine>, Option<usize>) {
    let mut logical = Vec::with_capacity(lines.len());
    let mut current: Option<LogicalLine> = None;

    for (idx, line) in lines.iter().enumerate() {
        let entry = current.get_or_insert_with(|| LogicalLine {
            start: idx,
            text: String::new(),
        });
        match continuation_body(line) {
            Some(body) => entry.text.push_str(body),
            None => {
                entry.text.push_str(line);
                logical.extend(current.take());
            }
        }
    }

    let dangling = current.is_some().then(|| lines.len() - 1);
    logical.extend(current);
    (logical, dangling)
}

/// Position of the `*/` that ends a block comment, searching from `from`.
fn comment_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(2)
        .position(|pair| pair == b"*/")
        .map(|pos| from + pos)
}

/// Index just past a character or string literal whose body starts at `i`.
/// An unterminated literal runs to the end of the line.
fn skip_literal(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Comment state the preprocessor carries between lines of a skipped group.
#[derive(Default)]
struct SkippedGroupLexer {
    /// Physical line of a `/*` that has not been closed yet.
    open_comment: Option<usize>,
}

impl SkippedGroupLexer {
    /// Lex one logical line and return its directive name, if any.
    ///
    /// Skipped groups are still tokenised. Literals end at the line end at the
    /// latest, while `/*` runs until the next `*/` on any later line.
    fn lex_line<'a>(&mut self, text: &'a str, line: usize) -> Option<&'a str> {
        let bytes = text.as_bytes();
        let mut i = 0;
        let mut seen_token = false;
        let mut directive = None;

        if self.open_comment.is_some() {
            let end = comment_end(bytes, 0)?;
            self.open_comment = None;
            i = end + 2;
            seen_token = true;
        }

        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => match comment_end(bytes, i + 2) {
                    Some(end) => i = end + 2,
                    None => {
                        self.open_comment = Some(line);
                        break;
                    }
                },
                b'/' if bytes.get(i + 1) == Some(&b'/') => break,
                quote @ (b'"' | b'\'') => {
                    i = skip_literal(bytes, i + 1, quote);
                    seen_token = true;
                }
                b'#' if !seen_token => {
                    directive = directive_name(&text[i..]);
                    seen_token = true;
                    i += 1;
                }
                c if c.is_ascii_whitespace() => i += 1,
                _ => {
                    seen_token = true;
                    i += 1;
                }
            }
        }

        directive
    }
}

/// Walk the guest lines the way the preprocessor walks a skipped group.
///
/// Nested conditionals must balance. Neither an unclosed `/*` nor a trailing
/// backslash may reach the closing `#endif`.
fn skipped_group_collisions(guest: &[String]) -> Vec<FenceCollision> {
    let (logical, dangling) = splice_lines(guest);
    let mut collisions = Vec::new();
    let mut lexer = SkippedGroupLexer::default();
    let mut open_groups: Vec<usize> = Vec::new();
    let collision = |idx: usize, reason: String| FenceCollision {
        side: Side::Guest,
        line: idx + 1,
        text: guest[idx].clone(),
        reason,
    };

    for line in &logical {
        let Some(name) = lexer.lex_line(&line.text, line.start) else {
            continue;
        };

        if CONDITIONAL_OPENERS.contains(&name) {
            open_groups.push(line.start);
        } else if CONDITIONAL_BRANCHES.contains(&name) && open_groups.is_empty() {
            collisions.push(collision(
                line.start,
                format!("`#{name}` would reactivate the hidden guest copy"),
            ));
        } else if name == CONDITIONAL_CLOSER && open_groups.pop().is_none() {
            collisions.push(collision(
                line.start,
                "`#endif` would close the hidden guest copy early".to_string(),
            ));
        }
    }

    for idx in open_groups {
        collisions.push(collision(
            idx,
            "unterminated conditional would swallow the closing `#endif`".to_string(),
        ));
    }
    if let Some(idx) = lexer.open_comment {
        collisions.push(collision(
            idx,
            "unclosed `/*` comment would swallow the closing `#endif`".to_string(),
        ));
    }
    if let Some(idx) = dangling {
        collisions.push(collision(
            idx,
            "trailing backslash would splice the closing `#endif` into this line".to_string(),
        ));
    }

    collisions.sort_by_key(|c| c.line);
    collisions
}
