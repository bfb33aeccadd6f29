//! Rule checking children against the content model of their parent.
//!
//! # Rationale
//!
//! Each element restricts which elements may appear inside it, e.g. `<ul>`
//! only accepts `<li>` and `<span>` only accepts phrasing content. Some
//! elements further restrict all of their descendants, e.g. `<a>` cannot
//! contain interactive content at any depth.
//!
//! Transparent elements such as `<a>` are looked through: their children
//! are checked against the rules of the transparent element's parent.

use html_lint_core::meta::Permitted;
use html_lint_core::{
    DomTree, Event, EventKind, NodeId, Rule, RuleBox, RuleContext, RuleInitError, RuleOptions,
    Validator,
};

/// Rule name for element-permitted-content.
pub const NAME: &str = "element-permitted-content";

/// Checks children against the parent's content model.
#[derive(Debug, Clone, Default)]
pub struct ElementPermittedContent;

impl ElementPermittedContent {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns true if an error was reported for `node` or a transparent child.
    fn check_content(
        dom: &DomTree,
        node: NodeId,
        parent: NodeId,
        rules: Option<&Permitted>,
        ctx: &mut RuleContext<'_>,
    ) -> bool {
        if !Validator::validate_permitted(dom, node, rules) {
            ctx.report(
                node,
                format!(
                    "<{}> element is not permitted as content under <{}>",
                    dom.tag_name(node),
                    dom.tag_name(parent)
                ),
            );
            return true;
        }

        let mut reported = false;
        for child in Validator::transparent_children(dom, node) {
            reported |= Self::check_content(dom, child, parent, rules, ctx);
        }
        reported
    }

    fn check_descendant(dom: &DomTree, node: NodeId, ctx: &mut RuleContext<'_>) {
        for ancestor in dom.ancestors(node) {
            let rules = dom
                .element(ancestor)
                .and_then(|el| el.meta.as_ref())
                .and_then(|meta| meta.permitted_descendants.as_ref());
            if rules.is_none() {
                continue;
            }
            if !Validator::validate_permitted(dom, node, rules) {
                ctx.report(
                    node,
                    format!(
                        "<{}> element is not permitted as a descendant of <{}>",
                        dom.tag_name(node),
                        dom.tag_name(ancestor)
                    ),
                );
                return;
            }
        }
    }
}

pub(crate) fn create(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(ElementPermittedContent::new()))
}

impl Rule for ElementPermittedContent {
    fn description(&self) -> &'static str {
        "Checks children against the parent's content model"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::DomReady]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        if !matches!(event, Event::DomReady { .. }) {
            return;
        }
        let dom = ctx.dom();
        for node in dom.descendants(dom.root()) {
            if dom.element(node).is_none() {
                continue;
            }
            let Some(parent) = dom.parent(node).filter(|p| *p != dom.root()) else {
                continue;
            };
            let rules = dom
                .element(parent)
                .and_then(|el| el.meta.as_ref())
                .and_then(|meta| meta.permitted_content.as_ref());
            if Self::check_content(dom, node, parent, rules, ctx) {
                continue;
            }
            Self::check_descendant(dom, node, ctx);
        }
    }
}
