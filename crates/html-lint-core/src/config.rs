//! Configuration types for html-lint.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::meta::{MetaElementDef, MetaTable};
use crate::rule::{Plugin, RuleOptions};
use crate::types::Severity;

/// Top-level configuration for html-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Per-rule configurations, in declaration order.
    #[serde(default)]
    pub rules: IndexMap<String, RuleConfig>,

    /// Extra or overriding element metadata.
    #[serde(default)]
    pub elements: IndexMap<String, MetaElementDef>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Adds a rule entry, replacing any existing one.
    #[must_use]
    pub fn with_rule(mut self, name: &str, config: RuleConfig) -> Self {
        self.rules.insert(name.to_owned(), config);
        self
    }

    /// Puts preset entries in front of the explicit rule entries.
    ///
    /// Explicitly configured rules keep their configuration and position
    /// after the preset rules.
    pub fn apply_preset<'a>(&mut self, preset: impl IntoIterator<Item = (&'a str, Severity)>) {
        let mut rules: IndexMap<String, RuleConfig> = preset
            .into_iter()
            .filter(|(name, _)| !self.rules.contains_key(*name))
            .map(|(name, severity)| (name.to_owned(), RuleConfig::new(severity)))
            .collect();
        rules.extend(std::mem::take(&mut self.rules));
        self.rules = rules;
    }

    /// Loads the built-in element table, applies `[elements]` on top and
    /// fixes the rule map.
    ///
    /// # Errors
    ///
    /// Returns an error if an element definition is invalid.
    pub fn resolve(&self, plugins: Vec<Arc<dyn Plugin>>) -> Result<ResolvedConfig, ConfigError> {
        let mut meta = MetaTable::html5()?;
        meta.extend(self.elements.clone())?;
        Ok(ResolvedConfig {
            rules: self.rules.clone(),
            meta,
            plugins,
        })
    }
}

/// Configuration of a single rule: severity plus options.
///
/// Accepted forms:
///
/// ```toml
/// [rules]
/// close-order = "warn"
/// deprecated = 2
/// no-self-closing = ["error", { ignore_foreign = true }]
///
/// [rules.attr-case]
/// severity = "error"
/// style = "lowercase"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleConfigRepr")]
pub struct RuleConfig {
    /// Severity of reports.
    pub severity: Severity,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: RuleOptions,
}

impl RuleConfig {
    /// Creates a rule configuration without options.
    #[must_use]
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            options: RuleOptions::new(),
        }
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleConfigRepr {
    Short(Severity),
    List(Vec<toml::Value>),
    Table(toml::Table),
}

/// Error produced while reading a single rule entry.
#[derive(Debug)]
pub struct InvalidRuleConfig(String);

impl fmt::Display for InvalidRuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn severity_of(value: toml::Value) -> Result<Severity, InvalidRuleConfig> {
    value
        .try_into()
        .map_err(|e: toml::de::Error| InvalidRuleConfig(format!("invalid severity: {e}")))
}

impl TryFrom<RuleConfigRepr> for RuleConfig {
    type Error = InvalidRuleConfig;

    fn try_from(repr: RuleConfigRepr) -> Result<Self, Self::Error> {
        match repr {
            RuleConfigRepr::Short(severity) => Ok(Self::new(severity)),
            RuleConfigRepr::List(values) => {
                let mut values = values.into_iter();
                let severity = values
                    .next()
                    .ok_or_else(|| InvalidRuleConfig("empty rule entry".to_string()))
                    .and_then(severity_of)?;
                let options = match values.next() {
                    None => RuleOptions::new(),
                    Some(toml::Value::Table(table)) => RuleOptions(table),
                    Some(other) => {
                        return Err(InvalidRuleConfig(format!(
                            "expected an option table, found {}",
                            other.type_str()
                        )))
                    }
                };
                if values.next().is_some() {
                    return Err(InvalidRuleConfig(
                        "expected [severity] or [severity, options]".to_string(),
                    ));
                }
                Ok(Self { severity, options })
            }
            RuleConfigRepr::Table(mut table) => {
                let severity = table
                    .remove("severity")
                    .map(severity_of)
                    .transpose()?
                    .unwrap_or_default();
                Ok(Self {
                    severity,
                    options: RuleOptions(table),
                })
            }
        }
    }
}

/// Configuration ready to drive an [`Engine`](crate::Engine).
#[derive(Clone)]
pub struct ResolvedConfig {
    rules: IndexMap<String, RuleConfig>,
    meta: MetaTable,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl ResolvedConfig {
    /// Resolved configuration with the built-in element table and no rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in element table is invalid.
    pub fn html5() -> Result<Self, ConfigError> {
        Config::new().resolve(Vec::new())
    }

    /// Adds or replaces a rule entry.
    #[must_use]
    pub fn with_rule(mut self, name: &str, severity: Severity, options: RuleOptions) -> Self {
        self.rules
            .insert(name.to_owned(), RuleConfig::new(severity).with_options(options));
        self
    }

    /// Configured rules in order.
    #[must_use]
    pub fn rules(&self) -> &IndexMap<String, RuleConfig> {
        &self.rules
    }

    /// Element metadata.
    #[must_use]
    pub fn meta_table(&self) -> &MetaTable {
        &self.meta
    }

    /// Loaded plugins.
    #[must_use]
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("rules", &self.rules)
            .field("elements", &self.meta.len())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.preset.is_none());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_parse_rule_forms() {
        let toml = r#"
preset = "recommended"

[rules]
close-order = "warn"
deprecated = 2
void-content = "off"
no-self-closing = ["error", { ignore_foreign = true }]

[rules.attr-case]
severity = "warn"
style = "uppercase"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("recommended"));

        let names: Vec<_> = config.rules.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["close-order", "deprecated", "void-content", "no-self-closing", "attr-case"]
        );
        assert_eq!(config.rules["close-order"].severity, Severity::Warn);
        assert_eq!(config.rules["deprecated"].severity, Severity::Error);
        assert_eq!(config.rules["void-content"].severity, Severity::Disabled);

        let self_closing = &config.rules["no-self-closing"];
        assert!(self_closing.options.get_bool("ignore_foreign", false));

        let attr_case = &config.rules["attr-case"];
        assert_eq!(attr_case.severity, Severity::Warn);
        assert_eq!(attr_case.options.get_str("style", "lowercase"), "uppercase");
        assert!(attr_case.options.0.get("severity").is_none());
    }

    #[test]
    fn test_invalid_severity() {
        let err = Config::parse("[rules]\nclose-order = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = Config::parse("[rules]\nclose-order = [\"warn\", 3]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_apply_preset_keeps_explicit_entries() {
        let mut config = Config::parse("[rules]\ndeprecated = \"warn\"").unwrap();
        config.apply_preset([("close-order", Severity::Error), ("deprecated", Severity::Error)]);

        let names: Vec<_> = config.rules.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["close-order", "deprecated"]);
        assert_eq!(config.rules["deprecated"].severity, Severity::Warn);
    }

    #[test]
    fn test_resolve_applies_elements() {
        let toml = r#"
[elements.my-widget]
flow = true
permitted_content = ["@phrasing"]
"#;
        let resolved = Config::parse(toml).unwrap().resolve(Vec::new()).unwrap();
        let widget = resolved.meta_table().get("my-widget").expect("widget meta");
        assert!(widget.flow);
        assert!(resolved.meta_table().get("div").is_some());
    }

    #[test]
    fn test_resolve_rejects_unknown_category() {
        let toml = r#"
[elements.my-widget]
permitted_content = ["@bogus"]
"#;
        let err = Config::parse(toml).unwrap().resolve(Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Meta(_)));
    }
}
