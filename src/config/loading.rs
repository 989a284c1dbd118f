use std::fs;
use std::path::{Path, PathBuf};

use super::{CONFIG_FILE_NAME, ConfigError, PolyglotConfig};

/// Prevent runaway traversal on odd filesystems
const MAX_DEPTH: usize = 100;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults, no file involved
    Default,
    /// Loaded from this file
    File(PathBuf),
}

/// Discover `.polyglot.toml` by walking up from `start_dir`.
///
/// The search stops at the first directory containing `.git`, so a project
/// never picks up configuration from outside its repository.
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();

    for _ in 0..MAX_DEPTH {
        log::debug!("[polyglot-config] Searching for config in: {}", current_dir.display());

        let config_path = current_dir.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            log::debug!("[polyglot-config] Found config file: {}", config_path.display());
            return Some(config_path);
        }

        if current_dir.join(".git").exists() {
            log::debug!("[polyglot-config] Stopping at .git directory");
            return None;
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_owned(),
            None => return None,
        }
    }

    log::debug!("[polyglot-config] Maximum traversal depth reached");
    None
}

/// Read and parse one configuration file.
pub fn load_config(path: &Path) -> Result<PolyglotConfig, ConfigError> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        source: e,
        path: path_str.clone(),
    })?;
    PolyglotConfig::from_toml_str(&content, &path_str)
}

/// Resolve the effective configuration.
///
/// An explicit path must exist; otherwise the file is discovered from
/// `start_dir` unless `no_config` is set.
pub fn resolve_config(
    explicit: Option<&Path>,
    no_config: bool,
    start_dir: &Path,
) -> Result<(PolyglotConfig, ConfigSource), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, ConfigSource::File(path.to_path_buf())));
    }

    if no_config {
        return Ok((PolyglotConfig::default(), ConfigSource::Default));
    }

    match discover_config(start_dir) {
        Some(path) => Ok((load_config(&path)?, ConfigSource::File(path))),
        None => Ok((PolyglotConfig::default(), ConfigSource::Default)),
    }
}

/// Default `.polyglot.toml` written by `polyglot init`.
pub const DEFAULT_CONFIG: &str = r#"# polyglot configuration file

# What to do when a line would break the guest fence once merged:
# "fail" refuses to write the output, "warn" writes it anyway
on-collision = "fail"

# Timeout per syntax checker run in milliseconds (0 waits forever)
timeout = 30000

# Run advisory linters (pyflakes for Python) after the syntax check
advisory = true

# Extra file extensions (uncomment and modify as needed)
[extensions]
# ".pyw" = "python"
# ".hpp" = "cpp"

# Checker overrides per language (uncomment and modify as needed).
# "{file}" is replaced by the input path; without it the path is appended.
# success = "quiet" requires exit code 0 and no output,
# success = { marker = "..." } requires exit code 0 and the marker text.

# [checkers.cpp]
# gate = [{ command = ["clang++", "-fsyntax-only", "{file}"] }]

# [checkers.python]
# gate = [{ command = ["python3.12", "-c", "import ast, sys; ast.parse(open(sys.argv[1]).read())", "{file}"] }]
# advisory = [{ command = ["ruff", "check", "--quiet", "{file}"] }]

# [checkers.ruby]
# gate = [{ command = ["ruby", "-c", "{file}"], success = { marker = "Syntax OK" } }]
"#;

/// Create a default configuration file at the specified path.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn create_default_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::FileExists {
            path: path.display().to_string(),
        });
    }

    fs::write(path, DEFAULT_CONFIG).map_err(|e| ConfigError::IoError {
        source: e,
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnCollision;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config = PolyglotConfig::from_toml_str(DEFAULT_CONFIG, "default").unwrap();
        assert_eq!(config, PolyglotConfig::default());
        assert!(config.build_registry().is_ok());
    }

    #[test]
    fn test_discover_walks_upward_and_stops_at_git() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        let nested = root.join("project/src/deep");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(root.join("project/.git")).unwrap();

        // Above the repository boundary: must not be found
        fs::write(root.join(CONFIG_FILE_NAME), "on-collision = \"warn\"").unwrap();
        assert_eq!(discover_config(&nested), None);

        fs::write(root.join("project/src").join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(discover_config(&nested), Some(root.join("project/src").join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_resolve_explicit_and_no_config() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "on-collision = \"warn\"").unwrap();

        let (config, source) = resolve_config(Some(&path), false, temp.path()).unwrap();
        assert_eq!(config.on_collision, OnCollision::Warn);
        assert_eq!(source, ConfigSource::File(path));

        let (config, source) = resolve_config(None, true, temp.path()).unwrap();
        assert_eq!(config, PolyglotConfig::default());
        assert_eq!(source, ConfigSource::Default);
    }

    #[test]
    fn test_resolve_missing_explicit_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = resolve_config(Some(&temp.path().join("nope.toml")), false, temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }

    #[test]
    fn test_create_default_config_fails_if_file_exists() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "# Existing config").unwrap();

        let err = create_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("Configuration file already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Existing config");

        create_default_config(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
