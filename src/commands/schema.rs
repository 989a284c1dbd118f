//! Handler for the `schema` command.

use colored::*;

use polyglot_lib::config::PolyglotConfig;
use polyglot_lib::exit_codes::exit;

/// Print the JSON schema of `.polyglot.toml` to stdout.
pub fn handle_schema() {
    use schemars::schema_for;

    let schema = schema_for!(PolyglotConfig);
    let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_else(|e| {
        eprintln!("{}: Failed to serialize schema: {}", "Error".red().bold(), e);
        exit::config_error();
    });

    println!("{schema_json}");
}
