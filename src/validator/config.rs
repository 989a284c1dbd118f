//! Configuration types for syntax checkers.
//!
//! A checker is an external command run against an input file, plus a
//! predicate that decides from its output whether the file is clean.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the input path in a checker command.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// How to read a checker's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessPredicate {
    /// Exit code 0 and nothing at all on stdout or stderr
    #[default]
    Quiet,
    /// Exit code 0 and the given text somewhere in the output
    Marker(String),
}

impl SuccessPredicate {
    /// Apply the predicate to a finished checker run.
    pub fn accepts(&self, exit_success: bool, combined_output: &str) -> bool {
        match self {
            SuccessPredicate::Quiet => exit_success && combined_output.trim().is_empty(),
            SuccessPredicate::Marker(marker) => exit_success && combined_output.contains(marker.as_str()),
        }
    }
}

/// Definition of one checker command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct CheckerDefinition {
    /// Command to run (first element is the binary, rest are arguments).
    /// `{file}` is replaced by the input path; without it the path is appended.
    pub command: Vec<String>,

    /// Success predicate (default: "quiet")
    #[serde(default)]
    pub success: SuccessPredicate,
}

impl CheckerDefinition {
    pub fn new(command: &[&str], success: SuccessPredicate) -> Self {
        Self {
            command: command.iter().map(|s| s.to_string()).collect(),
            success,
        }
    }

    /// Binary name, if the command is not empty.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Arguments with the file placeholder expanded.
    pub fn args_for(&self, path: &str) -> Vec<String> {
        let rest = self.command.iter().skip(1);
        if self.command.iter().any(|arg| arg.contains(FILE_PLACEHOLDER)) {
            rest.map(|arg| arg.replace(FILE_PLACEHOLDER, path)).collect()
        } else {
            rest.cloned().chain(std::iter::once(path.to_string())).collect()
        }
    }

    /// Command line for log and listing output.
    pub fn display_command(&self) -> String {
        self.command.join(" ")
    }
}

/// Checkers for one language.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct LanguageCheckers {
    /// Syntax gate: tried in order, the first installed checker decides
    #[serde(default)]
    pub gate: Vec<CheckerDefinition>,

    /// Advisory linters: output is reported but never blocks the merge
    #[serde(default)]
    pub advisory: Vec<CheckerDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_predicate() {
        let predicate = SuccessPredicate::Quiet;
        assert!(predicate.accepts(true, ""));
        assert!(predicate.accepts(true, "\n"));
        assert!(!predicate.accepts(true, "warning: unused variable"));
        assert!(!predicate.accepts(false, ""));
    }

    #[test]
    fn test_marker_predicate() {
        let predicate = SuccessPredicate::Marker("Syntax OK".to_string());
        assert!(predicate.accepts(true, "warning: ...\nSyntax OK\n"));
        assert!(!predicate.accepts(true, "syntax error, unexpected end-of-input"));
        assert!(!predicate.accepts(false, "Syntax OK"));
    }

    #[test]
    fn test_args_with_placeholder() {
        let checker = CheckerDefinition::new(&["g++", "-fsyntax-only", "-x", "c", "{file}"], SuccessPredicate::Quiet);
        assert_eq!(checker.program(), Some("g++"));
        assert_eq!(checker.args_for("dir/a.c"), vec!["-fsyntax-only", "-x", "c", "dir/a.c"]);
    }

    #[test]
    fn test_args_without_placeholder_appends_path() {
        let checker = CheckerDefinition::new(&["bash", "-n"], SuccessPredicate::Quiet);
        assert_eq!(checker.args_for("b.sh"), vec!["-n", "b.sh"]);
    }

    #[test]
    fn test_deserialize_checkers() {
        let toml = r#"
gate = [
    { command = ["ruby", "-c", "{file}"], success = { marker = "Syntax OK" } },
    { command = ["true"] },
]
advisory = [{ command = ["rubocop"], success = "quiet" }]
"#;

        let checkers: LanguageCheckers = toml::from_str(toml).expect("Failed to parse TOML");
        assert_eq!(checkers.gate.len(), 2);
        assert_eq!(checkers.gate[0].success, SuccessPredicate::Marker("Syntax OK".to_string()));
        assert_eq!(checkers.gate[1].success, SuccessPredicate::Quiet);
        assert_eq!(checkers.advisory[0].program(), Some("rubocop"));
    }
}
