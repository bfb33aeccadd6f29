//! Rule to forbid obsolete elements.
//!
//! # Rationale
//!
//! Elements such as `<center>`, `<font>` and `<marquee>` are obsolete in
//! HTML5. Browsers still render them, but styling belongs in CSS.
//!
//! # Configuration
//!
//! - `allow`: Tag names to accept anyway (default: none)

use html_lint_core::{Event, EventKind, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions};

/// Rule name for deprecated.
pub const NAME: &str = "deprecated";

/// Forbids obsolete elements.
#[derive(Debug, Clone, Default)]
pub struct Deprecated {
    /// Lowercased tag names that are accepted.
    pub allow: Vec<String>,
}

impl Deprecated {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the given tags.
    #[must_use]
    pub fn allow(mut self, tags: Vec<String>) -> Self {
        self.allow = tags.into_iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }
}

pub(crate) fn create(options: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(Deprecated::new().allow(options.get_str_array("allow"))))
}

impl Rule for Deprecated {
    fn description(&self) -> &'static str {
        "Forbids obsolete elements"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagStart]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let Event::TagStart { target, .. } = event else {
            return;
        };
        let Some(element) = ctx.dom().element(*target) else {
            return;
        };
        if !element.meta.as_ref().is_some_and(|meta| meta.deprecated) {
            return;
        }
        let tag = element.tag_name.to_ascii_lowercase();
        if self.allow.contains(&tag) {
            return;
        }
        ctx.report(*target, format!("<{tag}> is deprecated"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{check, lint};

    #[test]
    fn test_current_elements_pass() {
        assert_eq!(check(NAME, "<div><span>text</span></div>"), "");
    }

    #[test]
    fn test_detects_obsolete_elements() {
        insta::assert_snapshot!(check(NAME, "<center><font>old</font></center>"), @r"
        1:2: error [deprecated] <center> is deprecated
        1:10: error [deprecated] <font> is deprecated
        ");
    }

    #[test]
    fn test_allow_option() {
        let options = RuleOptions::new().with("allow", vec!["marquee"]);
        assert!(lint(NAME, options, "<marquee>hi</marquee>").is_empty());
    }
}
