//! Command handlers for the polyglot CLI.
//!
//! Each subcommand has its own module with a public handler function
//! that `main()` dispatches to.

pub mod extract;
pub mod init;
pub mod languages;
pub mod merge;
pub mod schema;

use colored::*;
use polyglot_lib::error::PolyglotError;
use polyglot_lib::exit_codes::exit;

/// Print an error and exit with its code.
pub fn fail(err: &PolyglotError) -> ! {
    let message = err.to_string();
    eprintln!("{}: {}", "Error".red().bold(), message.trim_end());
    exit::with_code(err.exit_code());
}
