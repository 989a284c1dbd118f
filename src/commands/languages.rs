//! Handler for the `languages` command.

use colored::*;

use polyglot_lib::exit_codes::exit;
use polyglot_lib::registry::{LanguageRecord, LanguageRegistry};

use crate::OutputFormat;

/// Language metadata for JSON export
#[derive(serde::Serialize)]
struct LanguageInfo {
    /// Short name used in configuration keys (e.g., "python")
    name: &'static str,
    /// "host" for C/C++, "guest" otherwise
    role: &'static str,
    extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fence_open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fence_close: Option<String>,
    /// Gate checker commands, in fallback order
    gate: Vec<String>,
    advisory: Vec<String>,
}

impl From<&LanguageRecord> for LanguageInfo {
    fn from(record: &LanguageRecord) -> Self {
        Self {
            name: record.language.name(),
            role: if record.language.is_c_family() { "host" } else { "guest" },
            extensions: record.extensions.clone(),
            fence_open: record.fence.as_ref().map(|f| f.open.clone()),
            fence_close: record.fence.as_ref().map(|f| f.close.clone()),
            gate: record.checkers.gate.iter().map(|c| c.display_command()).collect(),
            advisory: record.checkers.advisory.iter().map(|c| c.display_command()).collect(),
        }
    }
}

/// List every registered language.
pub fn handle_languages(registry: &LanguageRegistry, output_format: OutputFormat) {
    let infos: Vec<LanguageInfo> = registry.records().iter().map(LanguageInfo::from).collect();

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&infos).unwrap_or_else(|e| {
                eprintln!("{}: Failed to serialize languages: {}", "Error".red().bold(), e);
                exit::config_error();
            });
            println!("{json}");
        }
        OutputFormat::Text => {
            for (record, info) in registry.records().iter().zip(&infos) {
                println!(
                    "{} {} ({})",
                    record.language.display_name().bold(),
                    info.extensions.join(" ").cyan(),
                    info.role
                );
                if let (Some(open), Some(close)) = (&info.fence_open, &info.fence_close) {
                    println!("  {} {open} ... {close}", "fence:".dimmed());
                }
                for command in &info.gate {
                    println!("  {} {command}", "gate:".dimmed());
                }
                for command in &info.advisory {
                    println!("  {} {command}", "advisory:".dimmed());
                }
            }
        }
    }
}
