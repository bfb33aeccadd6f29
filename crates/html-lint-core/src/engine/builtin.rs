//! Rules owned by the engine itself.

use crate::error::RuleInitError;
use crate::event::{Event, EventKind};
use crate::rule::{Rule, RuleBox, RuleContext, RuleOptions, RuleRegistry};

use super::NO_UNUSED_DISABLE;

/// Stands in for a configured rule without a definition.
pub(super) struct MissingRule;

impl Rule for MissingRule {
    fn events(&self) -> &'static [EventKind] {
        &[EventKind::DomLoad]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let message = format!("Definition for rule '{}' was not found", ctx.name());
        ctx.report_at(None, message, event.location().clone());
    }
}

/// Reports directives that suppressed nothing.
///
/// Reports are raised by the engine when a `disable-block` or
/// `disable-next` scope closes; the rule itself listens to nothing.
pub struct NoUnusedDisable;

impl Rule for NoUnusedDisable {
    fn description(&self) -> &'static str {
        "Disallows disable directives that suppress nothing"
    }

    fn events(&self) -> &'static [EventKind] {
        &[]
    }

    fn handle(&mut self, _event: &Event, _ctx: &mut RuleContext<'_>) {}
}

fn no_unused_disable(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(NoUnusedDisable))
}

/// Registry of the engine-owned rules.
#[must_use]
pub fn builtin_rules() -> RuleRegistry {
    RuleRegistry::new().with(NO_UNUSED_DISABLE, no_unused_disable)
}
