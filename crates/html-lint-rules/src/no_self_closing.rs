//! Rule to forbid self-closing syntax on non-void elements.
//!
//! # Rationale
//!
//! HTML ignores the `/>` on a non-void element: `<div/>` opens a `<div>`
//! that swallows the following content. The syntax only has meaning for
//! void elements and inside foreign content such as SVG.
//!
//! # Configuration
//!
//! - `ignore_foreign`: Allow inside `<svg>` and `<math>` (default: true)
//! - `ignore_xml`: Allow on namespaced tags like `<xi:include/>` (default: true)

use html_lint_core::{
    DomTree, Event, EventKind, NodeClosed, NodeId, Rule, RuleBox, RuleContext, RuleInitError,
    RuleOptions,
};

/// Rule name for no-self-closing.
pub const NAME: &str = "no-self-closing";

/// Forbids self-closed non-void elements.
#[derive(Debug, Clone)]
pub struct NoSelfClosing {
    /// Allow inside foreign elements.
    pub ignore_foreign: bool,
    /// Allow on namespaced tags.
    pub ignore_xml: bool,
}

impl Default for NoSelfClosing {
    fn default() -> Self {
        Self::new()
    }
}

impl NoSelfClosing {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore_foreign: true,
            ignore_xml: true,
        }
    }

    /// Sets whether to ignore foreign content.
    #[must_use]
    pub fn ignore_foreign(mut self, ignore: bool) -> Self {
        self.ignore_foreign = ignore;
        self
    }

    /// Sets whether to ignore namespaced tags.
    #[must_use]
    pub fn ignore_xml(mut self, ignore: bool) -> Self {
        self.ignore_xml = ignore;
        self
    }

    fn in_foreign(dom: &DomTree, node: NodeId) -> bool {
        std::iter::once(node)
            .chain(dom.ancestors(node))
            .filter_map(|id| dom.element(id))
            .any(|el| el.meta.as_ref().is_some_and(|meta| meta.foreign))
    }
}

pub(crate) fn create(options: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(
        NoSelfClosing::new()
            .ignore_foreign(options.get_bool("ignore_foreign", true))
            .ignore_xml(options.get_bool("ignore_xml", true)),
    ))
}

impl Rule for NoSelfClosing {
    fn description(&self) -> &'static str {
        "Forbids self-closed non-void elements"
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagEnd]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        let Event::TagEnd {
            previous: Some(node),
            ..
        } = event
        else {
            return;
        };
        let dom = ctx.dom();
        let Some(element) = dom.element(*node) else {
            return;
        };
        if element.closed != NodeClosed::VoidSelfClosed || element.is_void() {
            return;
        }
        if self.ignore_xml && element.tag_name.contains(':') {
            return;
        }
        if self.ignore_foreign && Self::in_foreign(dom, *node) {
            return;
        }
        ctx.report(
            *node,
            format!("Element <{}> must not be self-closed", element.tag_name),
        );
    }
}
