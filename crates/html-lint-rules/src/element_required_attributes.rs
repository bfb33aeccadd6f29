//! Rule requiring mandatory attributes.
//!
//! # Rationale
//!
//! Some elements are meaningless without certain attributes, e.g. an
//! `<img>` without `src`. Required attributes come from the element
//! metadata, so custom elements can declare their own.

use html_lint_core::{Event, EventKind, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions};

/// Rule name for element-required-attributes.
pub const NAME: &str = "element-required-attributes";

/// Requires mandatory attributes.
#[derive(Debug, Clone, Default)]
pub struct ElementRequiredAttributes;

impl ElementRequiredAttributes {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(ElementRequiredAttributes::new()))
}

impl Rule for ElementRequiredAttributes {
    fn description(&self) -> &'static str {
        "Requires mandatory attributes"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagReady]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let Event::TagReady { target, .. } = event else {
            return;
        };
        let Some(element) = ctx.dom().element(*target) else {
            return;
        };
        let Some(meta) = &element.meta else {
            return;
        };
        for attr in &meta.required_attributes {
            if element.attribute(attr).is_none() {
                ctx.report(
                    *target,
                    format!(
                        "<{}> is missing required \"{attr}\" attribute",
                        element.tag_name
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::check;

    #[test]
    fn test_present_attribute() {
        assert_eq!(check(NAME, "<img src=\"logo.png\">"), "");
        assert_eq!(check(NAME, "<img SRC=\"logo.png\">"), "");
    }

    #[test]
    fn test_detects_missing_attribute() {
        insta::assert_snapshot!(check(NAME, "<p><img alt=\"logo\"></p>"), @r#"1:5: error [element-required-attributes] <img> is missing required "src" attribute"#);
    }
}
