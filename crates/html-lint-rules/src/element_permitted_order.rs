//! Rule checking the order of children.
//!
//! # Rationale
//!
//! Some content models require children in a fixed order, e.g. a
//! `<summary>` must come first in `<details>` and a `<caption>` first in a
//! `<table>`. Children not named by the order are ignored.

use html_lint_core::{
    Event, EventKind, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions, Validator,
};

/// Rule name for element-permitted-order.
pub const NAME: &str = "element-permitted-order";

/// Checks the order of children.
#[derive(Debug, Clone, Default)]
pub struct ElementPermittedOrder;

impl ElementPermittedOrder {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(ElementPermittedOrder::new()))
}

impl Rule for ElementPermittedOrder {
    fn description(&self) -> &'static str {
        "Checks the order of children"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::DomReady]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        if !matches!(event, Event::DomReady { .. }) {
            return;
        }
        let dom = ctx.dom();
        for parent in dom.descendants(dom.root()) {
            let Some(order) = dom
                .element(parent)
                .and_then(|el| el.meta.as_ref())
                .and_then(|meta| meta.permitted_order.as_deref())
            else {
                continue;
            };

            let children = dom.child_elements(parent);
            let mut violations = Vec::new();
            Validator::validate_order(dom, &children, Some(order), |node, prev| {
                violations.push((node, prev));
            });

            for (node, prev) in violations {
                ctx.report(
                    node,
                    format!(
                        "Element <{}> must be used before <{}> in this context",
                        dom.tag_name(node),
                        dom.tag_name(prev)
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
    fn test_correct_order() {
        assert_eq!(
            check(NAME, "<details><summary>a</summary><p>b</p></details>"),
            ""
        );
        assert_eq!(
            check(
                NAME,
                "<table><caption></caption><thead></thead><tbody></tbody><tfoot></tfoot></table>"
            ),
            ""
        );
    }

    #[test]
    fn test_detects_late_summary() {
        insta::assert_snapshot!(
            check(NAME, "<details><p></p><summary></summary></details>"),
            @"1:18: error [element-permitted-order] Element <summary> must be used before <p> in this context"
        );
    }

    #[test]
    fn test_detects_tbody_after_tfoot() {
        insta::assert_snapshot!(
            check(NAME, "<table><tfoot></tfoot><tbody></tbody></table>"),
            @"1:24: error [element-permitted-order] Element <tbody> must be used before <tfoot> in this context"
        );
    }
}
