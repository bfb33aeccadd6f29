//! Rule requiring the HTML5 doctype.
//!
//! # Rationale
//!
//! `<!DOCTYPE html>` is the only doctype that puts every browser in
//! standards mode without referencing a legacy DTD.

use html_lint_core::{Event, EventKind, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions};

/// Rule name for doctype-html.
pub const NAME: &str = "doctype-html";

/// Requires the `<!DOCTYPE html>` doctype.
#[derive(Debug, Clone, Default)]
pub struct DoctypeHtml;

impl DoctypeHtml {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(DoctypeHtml::new()))
}

impl Rule for DoctypeHtml {
    fn description(&self) -> &'static str {
        "Requires the <!DOCTYPE html> doctype"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::Doctype]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let Event::Doctype {
            value,
            value_location,
            ..
        } = event
        else {
            return;
        };
        if value.eq_ignore_ascii_case("html") {
            return;
        }
        ctx.report_at(None, "doctype should be \"html\"", value_location.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::check;

    #[test]
    fn test_html5_doctype() {
        assert_eq!(check(NAME, "<!DOCTYPE html>\n<html></html>"), "");
        assert_eq!(check(NAME, "<!doctype HTML>"), "");
    }

    #[test]
    fn test_legacy_doctype() {
        insta::assert_snapshot!(
            check(NAME, "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\">"),
            @r#"1:11: error [doctype-html] doctype should be "html""#
        );
    }
}
