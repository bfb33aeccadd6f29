//! Rule traits, rule options and the rule registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocker::{NodeAnnotations, RuleBlocker, RuleState};
use crate::dom::{DomTree, NodeId};
use crate::error::RuleInitError;
use crate::event::{Event, EventKind};
use crate::types::{Location, Severity};

/// A lint rule driven by parser events.
///
/// A fresh instance is created for every source, so rules may keep
/// per-document state in `self`. A rule listens to the kinds returned by
/// [`Rule::events`] and reports through the [`RuleContext`].
///
/// # Example
///
/// ```ignore
/// use html_lint_core::{Event, EventKind, Rule, RuleContext};
///
/// pub struct NoBlink;
///
/// impl Rule for NoBlink {
///     fn events(&self) -> &'static [EventKind] {
///         &[EventKind::TagStart]
///     }
///
///     fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
///         if let Event::TagStart { target, .. } = event {
///             if ctx.dom().tag_name(*target) == "blink" {
///                 ctx.report(*target, "<blink> is not allowed");
///             }
///         }
///     }
/// }
/// ```
pub trait Rule {
    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns a documentation URL for this rule.
    fn url(&self) -> Option<&'static str> {
        None
    }

    /// Event kinds this rule subscribes to.
    fn events(&self) -> &'static [EventKind];

    /// Handles one subscribed event.
    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>);
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Constructs a rule from its options.
pub type RuleFactory = fn(&RuleOptions) -> Result<RuleBox, RuleInitError>;

/// A report produced while handling one event.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleReport {
    /// Element the report is about.
    pub node: Option<NodeId>,
    /// Message text.
    pub message: String,
    /// Location of the problem.
    pub location: Location,
    /// Extra data for formatters.
    pub context: Option<Value>,
    /// Whether the report would be written if unblocked.
    pub enabled: bool,
    /// Blockers active for the report.
    pub blockers: Vec<RuleBlocker>,
}

/// Reporting surface handed to a rule for one event.
pub struct RuleContext<'a> {
    name: &'a str,
    dom: &'a DomTree,
    state: &'a RuleState,
    annotations: &'a NodeAnnotations,
    reports: Vec<RuleReport>,
}

impl<'a> RuleContext<'a> {
    /// Creates a context for rule `name`.
    #[must_use]
    pub fn new(
        name: &'a str,
        dom: &'a DomTree,
        state: &'a RuleState,
        annotations: &'a NodeAnnotations,
    ) -> Self {
        Self {
            name,
            dom,
            state,
            annotations,
            reports: Vec::new(),
        }
    }

    /// Name of the rule being run.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Tree as built so far.
    #[must_use]
    pub fn dom(&self) -> &'a DomTree {
        self.dom
    }

    /// Current severity of the rule.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.state.severity
    }

    /// Reports a problem at the element's location.
    pub fn report(&mut self, node: NodeId, message: impl Into<String>) {
        let location = self
            .dom
            .element(node)
            .map(|el| el.location.clone())
            .unwrap_or_default();
        self.push(Some(node), message.into(), location, None);
    }

    /// Reports a problem at an explicit location.
    pub fn report_at(&mut self, node: Option<NodeId>, message: impl Into<String>, location: Location) {
        self.push(node, message.into(), location, None);
    }

    /// Reports a problem with extra context for formatters.
    pub fn report_with_context(
        &mut self,
        node: Option<NodeId>,
        message: impl Into<String>,
        location: Location,
        context: Value,
    ) {
        self.push(node, message.into(), location, Some(context));
    }

    fn push(&mut self, node: Option<NodeId>, message: String, location: Location, context: Option<Value>) {
        let node_enabled = node.map_or(true, |n| self.annotations.rule_enabled(n, self.name));
        let mut blockers = self.state.blockers.clone();
        if let Some(node) = node {
            for blocker in self.annotations.blockers(node, self.name) {
                if !blockers.contains(blocker) {
                    blockers.push(*blocker);
                }
            }
        }
        self.reports.push(RuleReport {
            node,
            message,
            location,
            context,
            enabled: self.state.is_enabled() && node_enabled,
            blockers,
        });
    }

    /// Reports collected so far.
    #[must_use]
    pub fn into_reports(self) -> Vec<RuleReport> {
        self.reports
    }
}

/// Rule-specific options.
///
/// Wraps the option table of a rule entry:
///
/// ```toml
/// [rules.attr-case]
/// severity = "error"
/// style = "uppercase"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleOptions(pub toml::Table);

impl RuleOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// True when no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0.get(key).and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.0
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.0
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0
            .get(key)
            .and_then(toml::Value::as_str)
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(toml::Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Ordered map from rule name to factory.
///
/// A name mapped to `None` is known but has no implementation; configuring
/// it reports a missing definition.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: IndexMap<String, Option<RuleFactory>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule factory.
    #[must_use]
    pub fn with(mut self, name: &str, factory: RuleFactory) -> Self {
        self.register(name, Some(factory));
        self
    }

    /// Registers or replaces a rule; `None` marks it as undefined.
    pub fn register(&mut self, name: &str, factory: Option<RuleFactory>) {
        self.rules.insert(name.to_owned(), factory);
    }

    /// Adds every entry of `other`, replacing entries with the same name.
    pub fn merge(&mut self, other: RuleRegistry) {
        self.rules.extend(other.rules);
    }

    /// Looks up a rule. `Some(None)` means known but undefined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Option<RuleFactory>> {
        self.rules.get(name).copied()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rules.keys()).finish()
    }
}

/// Third-party extension providing rules.
pub trait Plugin: Send + Sync {
    /// Plugin name, used in logs.
    fn name(&self) -> &str;

    /// Called once when an engine is built with this plugin.
    fn init(&self) {}

    /// Rules provided by this plugin.
    fn rules(&self) -> RuleRegistry {
        RuleRegistry::new()
    }
}
