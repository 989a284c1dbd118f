//! Handler for the default merge command.

use colored::*;

use polyglot_lib::config::PolyglotConfig;
use polyglot_lib::pipeline::{MergeRequest, Polyglot};
use polyglot_lib::registry::LanguageRegistry;
use polyglot_lib::validator::ToolchainValidator;

use super::fail;

/// Validate both inputs and write the merged file.
pub fn handle_merge(request: &MergeRequest, config: &PolyglotConfig, registry: &LanguageRegistry, quiet: bool) {
    let validator = ToolchainValidator::from_registry(registry, config.timeout, config.advisory);
    let polyglot = Polyglot::new(registry, &validator).with_on_collision(config.on_collision);

    let report = match polyglot.run(request) {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    if quiet {
        return;
    }

    for (path, advisory) in &report.advisories {
        println!(
            "{} {} ({})",
            "Advisory:".yellow().bold(),
            path.display(),
            advisory.tool.dimmed()
        );
        for line in advisory.output.lines() {
            println!("  {line}");
        }
    }

    if !report.collisions.is_empty() {
        println!(
            "{} {} fence collision(s) tolerated, the {} side may not parse",
            "Warning:".yellow().bold(),
            report.collisions.len(),
            report.pairing.guest
        );
    }

    println!(
        "{} {} ({} {} + {} {}, {} lines)",
        "Wrote".green().bold(),
        report.output.display(),
        report.pairing.host,
        report.host.display(),
        report.pairing.guest,
        report.guest.display(),
        report.lines
    );
}
