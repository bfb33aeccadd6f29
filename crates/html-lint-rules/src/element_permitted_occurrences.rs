//! Rule checking that single-use children appear at most once.
//!
//! # Rationale
//!
//! Content models mark some children as optional singletons, e.g. a
//! `<table>` has at most one `<caption>` and `<html>` at most one `<head>`.
//! Every occurrence after the first is reported.

use indexmap::IndexMap;

use html_lint_core::{
    Event, EventKind, NodeId, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions, Validator,
};

/// Rule name for element-permitted-occurrences.
pub const NAME: &str = "element-permitted-occurrences";

/// Checks that single-use children appear once.
#[derive(Debug, Clone, Default)]
pub struct ElementPermittedOccurrences;

impl ElementPermittedOccurrences {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(ElementPermittedOccurrences::new()))
}

impl Rule for ElementPermittedOccurrences {
    fn description(&self) -> &'static str {
        "Checks that single-use children appear once"
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
            let Some(rules) = dom
                .element(parent)
                .and_then(|el| el.meta.as_ref())
                .and_then(|meta| meta.permitted_content.as_ref())
            else {
                continue;
            };

            let mut groups: IndexMap<String, Vec<NodeId>> = IndexMap::new();
            for child in dom.child_elements(parent) {
                groups
                    .entry(dom.tag_name(child).to_ascii_lowercase())
                    .or_default()
                    .push(child);
            }

            for nodes in groups.values() {
                let [first, rest @ ..] = nodes.as_slice() else {
                    continue;
                };
                if Validator::validate_occurrences(dom, *first, Some(rules), nodes.len()) {
                    continue;
                }
                for node in rest {
                    ctx.report(
                        *node,
                        format!(
                            "Element <{}> can only appear once under <{}>",
                            dom.tag_name(*node),
                            dom.tag_name(parent)
                        ),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::check;

    #[test]
    fn test_single_occurrence_passes() {
        assert_eq!(
            check(NAME, "<table><caption></caption><tr><td></td></tr><tr><td></td></tr></table>"),
            ""
        );
    }

    #[test]
    fn test_detects_repeated_caption() {
        insta::assert_snapshot!(
            check(NAME, "<table><caption></caption><caption></caption></table>"),
            @"1:28: error [element-permitted-occurrences] Element <caption> can only appear once under <table>"
        );
    }

    #[test]
    fn test_every_extra_occurrence_is_reported() {
        let output = check(
            NAME,
            "<details><summary>a</summary><summary>b</summary><summary>c</summary></details>",
        );
        assert_eq!(output.lines().count(), 2);
    }
}
