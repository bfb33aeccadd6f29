//! Rule requiring end tags to close the innermost open element.
//!
//! # Rationale
//!
//! Browsers silently repair mismatched end tags, often producing a tree very
//! different from what the author intended. Elements whose end tag is
//! optional (`<p>`, `<li>`, `<body>`, ...) may be closed implicitly.
//!
//! # Configuration
//!
//! This rule has no options.

use html_lint_core::{
    DomTree, Event, EventKind, Location, NodeClosed, NodeId, Rule, RuleBox, RuleContext,
    RuleInitError, RuleOptions,
};

/// Rule name for close-order.
pub const NAME: &str = "close-order";

/// Requires end tags to match the open elements.
#[derive(Debug, Clone, Default)]
pub struct CloseOrder;

impl CloseOrder {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(CloseOrder::new()))
}

fn optional_end(dom: &DomTree, node: NodeId) -> bool {
    dom.element(node)
        .and_then(|el| el.meta.as_ref())
        .is_some_and(|meta| meta.optional_end)
}

fn is_void(dom: &DomTree, node: NodeId) -> bool {
    dom.element(node).is_some_and(|el| el.is_void())
}

impl CloseOrder {
    fn check(
        dom: &DomTree,
        target: Option<NodeId>,
        previous: Option<NodeId>,
        location: &Location,
        ctx: &mut RuleContext<'_>,
    ) {
        match (target, previous) {
            // Closed by end of document.
            (None, Some(previous)) => {
                if optional_end(dom, previous) {
                    return;
                }
                ctx.report_at(
                    Some(previous),
                    format!(
                        "Missing close-tag, expected '</{}>' but document ended before it was found.",
                        dom.tag_name(previous)
                    ),
                    location.clone(),
                );
            }
            (Some(target), None) => {
                // Reported by void-content.
                if is_void(dom, target) {
                    return;
                }
                let location = dom
                    .element(target)
                    .map_or_else(|| location.clone(), |el| el.location.clone());
                ctx.report_at(
                    None,
                    format!("Stray end tag '</{}>'", dom.tag_name(target)),
                    location,
                );
            }
            (Some(target), Some(previous)) => {
                // Void and self-closed elements close themselves.
                if target == previous {
                    return;
                }
                let closed = dom.element(previous).map(|el| el.closed);
                if closed == Some(NodeClosed::EndTag) {
                    return;
                }
                if closed == Some(NodeClosed::Implicit) && optional_end(dom, previous) {
                    return;
                }
                let Some(end) = dom.element(target) else {
                    return;
                };
                ctx.report_at(
                    Some(previous),
                    format!(
                        "Mismatched close-tag, expected '</{}>' but found '</{}>'.",
                        dom.tag_name(previous),
                        end.tag_name
                    ),
                    end.location.clone(),
                );
            }
            (None, None) => {}
        }
    }
}

impl Rule for CloseOrder {
    fn description(&self) -> &'static str {
        "Requires end tags to match the open elements"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagEnd]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        if let Event::TagEnd {
            target,
            previous,
            location,
        } = event
        {
            let dom = ctx.dom();
            Self::check(dom, *target, *previous, location, ctx);
        }
    }
}
