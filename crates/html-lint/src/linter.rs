//! Convenience entry point combining configuration, presets and the
//! bundled rules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use html_lint_core::{Config, ConfigError, Engine, EngineError, Plugin, Report, Source};
use html_lint_rules::{bundled_rules, Preset};
use thiserror::Error;
use tracing::debug;

/// Errors from [`HtmlLint`].
#[derive(Debug, Error)]
pub enum LintError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configured rule could not be set up.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Linter with the bundled rules registered.
///
/// # Example
///
/// ```rust,ignore
/// let linter = HtmlLint::new(Config::parse(r#"preset = "minimal""#)?)?;
/// let report = linter.validate_file(Path::new("index.html"))?;
/// assert!(report.valid);
/// ```
#[derive(Debug)]
pub struct HtmlLint {
    engine: Engine,
}

impl HtmlLint {
    /// Creates a linter from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset is unknown or the configuration does
    /// not resolve.
    pub fn new(config: Config) -> Result<Self, LintError> {
        Self::with_plugins(config, Vec::new())
    }

    /// Creates a linter using the `recommended` preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled element metadata fails to load.
    pub fn recommended() -> Result<Self, LintError> {
        let mut config = Config::new();
        config.preset = Some(Preset::Recommended.as_str().to_owned());
        Self::new(config)
    }

    /// Creates a linter with additional plugins.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset is unknown or the configuration does
    /// not resolve.
    pub fn with_plugins(
        mut config: Config,
        plugins: Vec<Arc<dyn Plugin>>,
    ) -> Result<Self, LintError> {
        if let Some(name) = config.preset.take() {
            let preset: Preset = name.parse().map_err(ConfigError::UnknownPreset)?;
            debug!("Applying preset {}", preset.as_str());
            config.apply_preset(preset.rules());
        }
        let resolved = config.resolve(plugins)?;
        Ok(Self {
            engine: Engine::new(resolved, bundled_rules()),
        })
    }

    /// Lints a markup string.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule fails to initialize.
    pub fn validate_string(&self, markup: &str) -> Result<Report, LintError> {
        self.validate_source(&Source::inline(markup))
    }

    /// Lints one source.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule fails to initialize.
    pub fn validate_source(&self, source: &Source) -> Result<Report, LintError> {
        self.validate_sources(std::slice::from_ref(source))
    }

    /// Lints several sources into one report.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule fails to initialize.
    pub fn validate_sources(&self, sources: &[Source]) -> Result<Report, LintError> {
        Ok(self.engine.lint(sources)?)
    }

    /// Reads and lints a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a configured rule
    /// fails to initialize.
    pub fn validate_file(&self, path: &Path) -> Result<Report, LintError> {
        let data = std::fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.validate_source(&Source::new(path.display().to_string(), data))
    }

    /// Underlying engine, for debug dumps.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_preset_is_rejected() {
        let mut config = Config::new();
        config.preset = Some("nonexistent".to_owned());
        let err = HtmlLint::new(config).unwrap_err();
        assert!(matches!(
            err,
            LintError::Config(ConfigError::UnknownPreset(ref name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn explicit_rules_override_preset() {
        let config = Config::parse(
            r#"
preset = "minimal"

[rules]
close-order = "off"
"#,
        )
        .unwrap();
        let linter = HtmlLint::new(config).unwrap();
        let rules = linter.engine().config().rules();
        assert_eq!(
            rules.get("close-order").map(|r| r.severity),
            Some(html_lint_core::Severity::Disabled)
        );
        assert!(rules.contains_key("no-dup-id"));
        assert!(linter.validate_string("<div>").unwrap().valid);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let linter = HtmlLint::recommended().unwrap();
        let err = linter
            .validate_file(Path::new("/nonexistent/index.html"))
            .unwrap_err();
        assert!(matches!(err, LintError::Io { .. }));
    }
}
