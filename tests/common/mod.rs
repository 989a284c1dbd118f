//! Shared helpers for CLI tests: a temporary workspace with checker overrides.
#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Checkers that accept every file without needing any compiler installed.
pub const ACCEPT_ALL: &str = r#"
[checkers.cpp]
gate = [{ command = ["true"] }]

[checkers.c]
gate = [{ command = ["true"] }]

[checkers.python]
gate = [{ command = ["true"] }]

[checkers.ruby]
gate = [{ command = ["true"] }]

[checkers.shell]
gate = [{ command = ["true"] }]

[checkers.perl]
gate = [{ command = ["true"] }]
"#;

/// Checkers that reject any file containing the word BROKEN, echoing a
/// compiler-style diagnostic.
pub const REJECT_BROKEN: &str = r#"
[checkers.cpp]
gate = [{ command = ["sh", "-c", 'if grep -q BROKEN "$1"; then echo "$1:1: error: broken"; exit 1; fi', "sh"] }]

[checkers.python]
gate = [{ command = ["sh", "-c", 'if grep -q BROKEN "$1"; then echo "$1:1: SyntaxError: broken"; exit 1; fi', "sh"] }]
"#;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        // Keep config discovery inside the workspace
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> &Self {
        fs::write(self.join(name), content).expect("Failed to write test file");
        self
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.join(name)).expect("Failed to read test file")
    }

    /// The binary, run inside the workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("polyglot");
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        cmd
    }

    /// The binary with `checkers.toml` as explicit configuration.
    pub fn cmd_with_checkers(&self, checkers: &str) -> Command {
        self.write("checkers.toml", checkers);
        let mut cmd = self.cmd();
        cmd.arg("--config").arg(self.join("checkers.toml"));
        cmd
    }
}
