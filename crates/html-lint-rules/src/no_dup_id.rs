//! Rule to forbid duplicate `id` values.
//!
//! # Rationale
//!
//! An `id` must be unique within the document. Duplicates break fragment
//! links, `<label for>` associations and `getElementById`.

use std::collections::HashSet;

use serde_json::json;

use html_lint_core::{Event, EventKind, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions};

/// Rule name for no-dup-id.
pub const NAME: &str = "no-dup-id";

/// Forbids duplicate `id` values.
#[derive(Debug, Clone, Default)]
pub struct NoDupId {
    seen: HashSet<String>,
}

impl NoDupId {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(NoDupId::new()))
}

impl Rule for NoDupId {
    fn description(&self) -> &'static str {
        "Forbids duplicate id values"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::Attr]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let Event::Attr(attr) = event else {
            return;
        };
        if !attr.key.eq_ignore_ascii_case("id") {
            return;
        }
        let Some(value) = attr.value.as_deref().filter(|v| !v.is_empty()) else {
            return;
        };
        if self.seen.insert(value.to_owned()) {
            return;
        }
        let location = attr
            .value_location
            .clone()
            .unwrap_or_else(|| attr.location.clone());
        ctx.report_with_context(
            Some(attr.target),
            format!("Duplicate ID \"{value}\""),
            location,
            json!({ "id": value }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::check;

    #[test]
    fn test_unique_ids() {
        assert_eq!(check(NAME, "<div id=\"a\"></div><p id=\"b\"></p><i id></i>"), "");
    }

    #[test]
    fn test_detects_duplicate() {
        insta::assert_snapshot!(
            check(NAME, "<div id=\"a\"></div><p id=\"a\"></p>"),
            @r#"1:27: error [no-dup-id] Duplicate ID "a""#
        );
    }

    #[test]
    fn test_context_carries_id() {
        let messages = crate::test_util::lint(
            NAME,
            RuleOptions::new(),
            "<b id=x></b><b id=x></b>",
        );
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].context, Some(json!({ "id": "x" })));
        assert_eq!(messages[0].selector.as_deref(), Some("b:nth-child(2)"));
    }
}
