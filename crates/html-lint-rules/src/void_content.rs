//! Rule to forbid end tags on void elements.
//!
//! # Rationale
//!
//! Void elements such as `<input>` and `<br>` cannot have content, and an
//! end tag like `</input>` is a parse error that browsers drop.

use html_lint_core::{Event, EventKind, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions};

/// Rule name for void-content.
pub const NAME: &str = "void-content";

/// Forbids end tags on void elements.
#[derive(Debug, Clone, Default)]
pub struct VoidContent;

impl VoidContent {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(VoidContent::new()))
}

impl Rule for VoidContent {
    fn description(&self) -> &'static str {
        "Forbids end tags on void elements"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagEnd]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        // Void elements are never open, so their end tags never match.
        let Event::TagEnd {
            target: Some(target),
            previous: None,
            ..
        } = event
        else {
            return;
        };
        let Some(end) = ctx.dom().element(*target) else {
            return;
        };
        if end.is_void() {
            ctx.report_at(
                None,
                format!("End tag for <{}> must be omitted", end.tag_name),
                end.location.clone(),
            );
        }
    }
}
