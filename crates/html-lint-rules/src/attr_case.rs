//! Rule requiring a consistent case for attribute names.
//!
//! # Rationale
//!
//! Attribute names are case-insensitive in HTML, so mixed styles are legal
//! but make markup harder to search and review.
//!
//! # Configuration
//!
//! - `style`: `"lowercase"` or `"uppercase"` (default: `"lowercase"`)
//! - `ignore_foreign`: Allow any case inside `<svg>` and `<math>`, where
//!   attributes like `viewBox` are case-sensitive (default: true)

use std::fmt;
use std::str::FromStr;

use html_lint_core::{
    DomTree, Event, EventKind, NodeId, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions,
};

/// Rule name for attr-case.
pub const NAME: &str = "attr-case";

/// Attribute name style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseStyle {
    /// All lowercase.
    #[default]
    Lowercase,
    /// All uppercase.
    Uppercase,
}

impl CaseStyle {
    /// True if `name` follows this style.
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::Lowercase => !name.chars().any(char::is_uppercase),
            Self::Uppercase => !name.chars().any(char::is_lowercase),
        }
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lowercase => f.write_str("lowercase"),
            Self::Uppercase => f.write_str("uppercase"),
        }
    }
}

impl FromStr for CaseStyle {
    type Err = RuleInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowercase" => Ok(Self::Lowercase),
            "uppercase" => Ok(Self::Uppercase),
            other => Err(RuleInitError::new(format!(
                "Invalid style \"{other}\" for {NAME}, expected \"lowercase\" or \"uppercase\""
            ))),
        }
    }
}

/// Requires a consistent case for attribute names.
#[derive(Debug, Clone)]
pub struct AttrCase {
    /// Required style.
    pub style: CaseStyle,
    /// Skip attributes of foreign elements.
    pub ignore_foreign: bool,
}

impl Default for AttrCase {
    fn default() -> Self {
        Self::new()
    }
}

impl AttrCase {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            style: CaseStyle::Lowercase,
            ignore_foreign: true,
        }
    }

    /// Sets the required style.
    #[must_use]
    pub fn style(mut self, style: CaseStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets whether to ignore foreign elements.
    #[must_use]
    pub fn ignore_foreign(mut self, ignore: bool) -> Self {
        self.ignore_foreign = ignore;
        self
    }

    fn in_foreign(dom: &DomTree, node: NodeId) -> bool {
        std::iter::once(node)
            .chain(dom.ancestors(node))
            .filter_map(|id| dom.element(id))
            .any(|el| el.meta.as_ref().is_some_and(|meta| meta.foreign))
    }
}

pub(crate) fn create(options: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    let style = options.get_str("style", "lowercase").parse()?;
    Ok(Box::new(
        AttrCase::new()
            .style(style)
            .ignore_foreign(options.get_bool("ignore_foreign", true)),
    ))
}

impl Rule for AttrCase {
    fn description(&self) -> &'static str {
        "Requires a consistent case for attribute names"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::Attr]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let Event::Attr(attr) = event else {
            return;
        };
        // Synthesized by a source hook; the author never wrote this name.
        if attr.original_attribute.is_some() {
            return;
        }
        if self.style.matches(&attr.key) {
            return;
        }
        if self.ignore_foreign && Self::in_foreign(ctx.dom(), attr.target) {
            return;
        }
        ctx.report_at(
            Some(attr.target),
            format!("Attribute \"{}\" should be {}", attr.key, self.style),
            attr.location.clone(),
        );
    }
}
