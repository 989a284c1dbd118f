//! Handler for the `init` command.

use colored::*;
use std::path::Path;

use polyglot_lib::config as polyglot_config;
use polyglot_lib::exit_codes::exit;

/// Write the default configuration file.
pub fn handle_init(path: &Path, force: bool, quiet: bool) {
    match polyglot_config::create_default_config(path, force) {
        Ok(()) => {
            if !quiet {
                println!("Created default configuration file: {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("{}: Failed to create config file: {e}", "Error".red().bold());
            if matches!(e, polyglot_config::ConfigError::FileExists { .. }) {
                eprintln!("Use --force to overwrite it");
            }
            exit::config_error();
        }
    }
}
