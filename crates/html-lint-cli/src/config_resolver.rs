//! Configuration file resolution.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/html-lint.toml` or `.html-lint.toml`
//! 3. No config found → the `recommended` preset

use anyhow::{Context, Result};
use html_lint::rules::Preset;
use html_lint::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["html-lint.toml", ".html-lint.toml"];

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    ConfigSource::Default
}

/// Loads the configuration a source resolved to.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        let mut config = Config::new();
        config.preset = Some(Preset::Recommended.as_str().to_owned());
        return Ok(config);
    };
    tracing::info!("Using config: {}", path.display());
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Directory used to look up the project config for `path`.
#[must_use]
pub fn project_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_takes_priority_over_project() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();
        fs::write(tmp.path().join("html-lint.toml"), "").unwrap();

        let result = resolve(tmp.path(), Some(&explicit));
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn html_lint_toml_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("html-lint.toml"), "").unwrap();
        fs::write(tmp.path().join(".html-lint.toml"), "").unwrap();

        let result = resolve(tmp.path(), None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join("html-lint.toml"))
        );
    }

    #[test]
    fn dot_html_lint_toml_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".html-lint.toml"), "").unwrap();

        let result = resolve(tmp.path(), None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join(".html-lint.toml"))
        );
    }

    #[test]
    fn no_config_uses_recommended_preset() {
        let tmp = TempDir::new().unwrap();
        let source = resolve(tmp.path(), None);
        assert_eq!(source, ConfigSource::Default);

        let config = load(&source).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
    }

    #[test]
    fn load_reports_missing_file() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/html-lint.toml"));
        let err = load(&source).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn project_dir_of_file_is_its_parent() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("index.html");
        fs::write(&file, "").unwrap();

        assert_eq!(project_dir(&file), tmp.path());
        assert_eq!(project_dir(tmp.path()), tmp.path());
        assert_eq!(project_dir(Path::new("index.html")), PathBuf::from("."));
    }
}
