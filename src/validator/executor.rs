//! Checker execution engine.
//!
//! Runs one checker command against a file path with both pipes captured,
//! timeout support and cached tool availability lookups.

use super::config::CheckerDefinition;
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result of running a checker.
#[derive(Debug, Clone)]
pub struct CheckOutput {
    /// Standard output from the checker.
    pub stdout: String,
    /// Standard error from the checker.
    pub stderr: String,
    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,
    /// Whether the process exited with status 0.
    pub success: bool,
}

impl CheckOutput {
    /// stdout followed by stderr, the way a shell `2>&1` would show them.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Error while running a checker.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Checker binary not found in PATH.
    #[error("Tool '{tool}' not found in PATH")]
    ToolNotFound { tool: String },
    /// The checker definition has no command.
    #[error("Checker has an empty command")]
    EmptyCommand,
    /// Checker did not finish in time.
    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },
    /// I/O error while spawning or talking to the checker.
    #[error("I/O error running '{tool}': {message}")]
    Io { tool: String, message: String },
}

/// Executor for running checkers.
///
/// Caches tool availability checks for efficiency.
pub struct CheckExecutor {
    /// Cache of tool availability checks (tool name -> available).
    tool_cache: Mutex<HashMap<String, bool>>,
    /// Timeout in milliseconds, 0 waits forever.
    timeout_ms: u64,
}

impl CheckExecutor {
    /// Create a new executor with the given timeout.
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            tool_cache: Mutex::new(HashMap::new()),
            timeout_ms,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Check if a tool is available (lazy, cached).
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        if let Some(&available) = self.cache().get(tool_name) {
            return available;
        }

        let available = check_tool_exists(tool_name);
        log::debug!("[polyglot-exec] tool '{tool_name}' available: {available}");
        self.cache().insert(tool_name.to_string(), available);
        available
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, bool>> {
        // A panic while holding the lock cannot leave the map inconsistent
        self.tool_cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run a checker against `path`.
    pub fn run(&self, checker: &CheckerDefinition, path: &Path) -> Result<CheckOutput, ExecutorError> {
        let tool_name = checker.program().ok_or(ExecutorError::EmptyCommand)?;

        if !self.is_tool_available(tool_name) {
            return Err(ExecutorError::ToolNotFound {
                tool: tool_name.to_string(),
            });
        }

        let path_arg = path.to_string_lossy();
        let args = checker.args_for(&path_arg);
        log::debug!("[polyglot-exec] running {tool_name} {}", args.join(" "));

        let mut child = Command::new(tool_name)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExecutorError::ToolNotFound {
                    tool: tool_name.to_string(),
                },
                _ => ExecutorError::Io {
                    tool: tool_name.to_string(),
                    message: format!("failed to spawn: {e}"),
                },
            })?;

        let mut stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));
        let mut stderr_handle = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || read_pipe_to_string(stderr)));

        let io_error = |message: String| ExecutorError::Io {
            tool: tool_name.to_string(),
            message,
        };

        let timeout = Duration::from_millis(self.timeout_ms);
        let status = if timeout.is_zero() {
            child.wait().map_err(|e| io_error(format!("failed to wait: {e}")))?
        } else {
            let start = Instant::now();
            loop {
                if let Some(status) = child.try_wait().map_err(|e| io_error(format!("failed to poll: {e}")))? {
                    break status;
                }
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Grandchildren (cc1plus, `sh -c` jobs) may still hold the
                    // pipes open, so the reader threads are detached, not joined
                    drop(stdout_handle.take());
                    drop(stderr_handle.take());
                    return Err(ExecutorError::Timeout {
                        tool: tool_name.to_string(),
                        timeout_ms: self.timeout_ms,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
        };

        let stdout = join_reader(stdout_handle.take()).map_err(io_error)?;
        let stderr = join_reader(stderr_handle.take()).map_err(io_error)?;

        Ok(CheckOutput {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
            success: status.success(),
        })
    }
}

impl Default for CheckExecutor {
    fn default() -> Self {
        Self::new(30_000) // 30 seconds default
    }
}

/// Check if a tool binary exists by searching `PATH`.
fn check_tool_exists(tool_name: &str) -> bool {
    let tool = Path::new(tool_name);
    if tool.components().count() > 1 {
        return tool.is_file();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(tool_name);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn join_reader(handle: Option<thread::JoinHandle<io::Result<String>>>) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to read output: {e}")),
            Err(_) => Err("Output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}
