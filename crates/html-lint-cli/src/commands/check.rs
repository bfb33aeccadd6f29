//! Check command implementation.

use anyhow::{Context, Result};
use html_lint::rules::bundled_rules;
use html_lint::{Config, HtmlLint, RuleConfig, Severity, Source, NO_UNUSED_DISABLE};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::OutputFormat;

/// File extensions linted when walking directories.
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Options of the check command.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names to run instead of the configured set.
    pub rules: Option<String>,
    /// Glob patterns to skip.
    pub exclude: Vec<String>,
    /// Fail on warnings too.
    pub max_warnings_zero: bool,
}

/// Runs the check command. Returns whether the run passed.
pub fn run(paths: &[PathBuf], options: &CheckOptions, config_path: Option<&Path>) -> Result<bool> {
    let root = paths.first().map_or_else(|| PathBuf::from("."), |p| config_resolver::project_dir(p));
    let source = config_resolver::resolve(&root, config_path);
    let mut config = config_resolver::load(&source)?;

    if let Some(filter) = &options.rules {
        let names: Vec<&str> = filter.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        filter_rules(&mut config, &names);
    }

    let linter = HtmlLint::new(config).context("Failed to build linter")?;

    let files = collect_files(paths, &options.exclude)?;
    tracing::info!("Linting {} file(s)", files.len());

    let sources = files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|data| Source::new(path.display().to_string(), data))
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = linter.validate_sources(&sources).context("Lint failed")?;

    super::output::print(&report, options.format, files.len())?;

    Ok(report.valid && !(options.max_warnings_zero && report.warning_count > 0))
}

/// Replaces the configured rule set with `names`.
///
/// Rules already configured keep their severity and options; the others
/// run as errors. The preset is dropped.
fn filter_rules(config: &mut Config, names: &[&str]) {
    let known = bundled_rules();
    config.preset = None;
    config.rules.retain(|name, _| names.contains(&name.as_str()));

    for name in names {
        if known.get(name).is_none() && *name != NO_UNUSED_DISABLE {
            tracing::warn!("Unknown rule: {}", name);
            continue;
        }
        if !config.rules.contains_key(*name) {
            config
                .rules
                .insert((*name).to_owned(), RuleConfig::new(Severity::Error));
        }
    }
}

/// Expands files and directories into the HTML files to lint.
///
/// Explicit files are always included; directories are walked honouring
/// `.gitignore` and `exclude`.
fn collect_files(paths: &[PathBuf], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let mut overrides = OverrideBuilder::new(path);
        for pattern in exclude {
            overrides
                .add(&format!("!{pattern}"))
                .with_context(|| format!("Invalid exclude pattern: {pattern}"))?;
        }
        let overrides = overrides.build().context("Invalid exclude patterns")?;

        let mut found = Vec::new();
        for entry in WalkBuilder::new(path).overrides(overrides).build() {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            let is_html = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| HTML_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if is_html && entry.file_type().is_some_and(|t| t.is_file()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().display().to_string())
            .collect()
    }

    #[test]
    fn collects_html_files_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("pages")).unwrap();
        fs::write(tmp.path().join("index.html"), "").unwrap();
        fs::write(tmp.path().join("pages/about.htm"), "").unwrap();
        fs::write(tmp.path().join("style.css"), "").unwrap();

        let files = collect_files(&[tmp.path().to_path_buf()], &[]).unwrap();
        assert_eq!(names(&files, tmp.path()), vec!["index.html", "pages/about.htm"]);
    }

    #[test]
    fn exclude_patterns_skip_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("vendor")).unwrap();
        fs::write(tmp.path().join("index.html"), "").unwrap();
        fs::write(tmp.path().join("vendor/lib.html"), "").unwrap();

        let files = collect_files(&[tmp.path().to_path_buf()], &["vendor/**".to_owned()]).unwrap();
        assert_eq!(names(&files, tmp.path()), vec!["index.html"]);
    }

    #[test]
    fn explicit_files_are_kept() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("page.txt");
        fs::write(&file, "").unwrap();

        let files = collect_files(&[file.clone()], &[]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn rule_filter_replaces_configured_rules() {
        let mut config = Config::parse(
            r#"
preset = "recommended"

[rules]
deprecated = "warn"
attr-case = "error"
"#,
        )
        .unwrap();
        filter_rules(&mut config, &["deprecated", "no-dup-id", "bogus"]);

        assert!(config.preset.is_none());
        let rules: Vec<_> = config
            .rules
            .iter()
            .map(|(name, rule)| (name.as_str(), rule.severity))
            .collect();
        assert_eq!(
            rules,
            vec![("deprecated", Severity::Warn), ("no-dup-id", Severity::Error)]
        );
    }

    #[test]
    fn run_fails_on_invalid_markup() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("ok.html"), "<p>fine</p>").unwrap();
        fs::write(tmp.path().join("bad.html"), "<ul><div></div></ul>").unwrap();

        let options = CheckOptions {
            format: OutputFormat::Compact,
            rules: None,
            exclude: Vec::new(),
            max_warnings_zero: false,
        };
        assert!(!run(&[tmp.path().to_path_buf()], &options, None).unwrap());

        fs::remove_file(tmp.path().join("bad.html")).unwrap();
        assert!(run(&[tmp.path().to_path_buf()], &options, None).unwrap());
    }

    #[test]
    fn warnings_fail_with_max_warnings_zero() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("html-lint.toml"),
            "[rules]\ndeprecated = \"warn\"\n",
        )
        .unwrap();
        fs::write(tmp.path().join("old.html"), "<center></center>").unwrap();

        let mut options = CheckOptions {
            format: OutputFormat::Json,
            rules: None,
            exclude: Vec::new(),
            max_warnings_zero: false,
        };
        assert!(run(&[tmp.path().to_path_buf()], &options, None).unwrap());

        options.max_warnings_zero = true;
        assert!(!run(&[tmp.path().to_path_buf()], &options, None).unwrap());
    }
}
