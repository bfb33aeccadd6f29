//! Content-model checks used by the bundled rules.

use super::{Permitted, Qualifier, Term, Transparent};
use crate::dom::{DomTree, NodeId};

/// Content-model validation helpers.
pub struct Validator;

impl Validator {
    /// True if `node` may appear under `rules`; `None` permits anything.
    #[must_use]
    pub fn validate_permitted(dom: &DomTree, node: NodeId, rules: Option<&Permitted>) -> bool {
        let Some(rules) = rules else { return true };
        let Some(element) = dom.element(node) else {
            return true;
        };
        rules.allows(&element.tag_name, element.meta.as_deref())
    }

    /// True unless `node` matches a `?` term and `count` exceeds one.
    ///
    /// Only the first top-level tag or category term matching the node
    /// decides the limit.
    #[must_use]
    pub fn validate_occurrences(
        dom: &DomTree,
        node: NodeId,
        rules: Option<&Permitted>,
        count: usize,
    ) -> bool {
        let Some(rules) = rules else { return true };
        let Some(element) = dom.element(node) else {
            return true;
        };
        let meta = element.meta.as_deref();
        let term = rules.terms.iter().find(|term| {
            matches!(term, Term::Tag { .. } | Term::Category { .. })
                && term.matches(&element.tag_name, meta, false)
        });
        match term.map(Term::qualifier) {
            Some(Qualifier::Optional) => count <= 1,
            _ => true,
        }
    }

    /// Checks that `children` never regress to an earlier position class.
    ///
    /// Children matching no entry are ignored; elements without metadata
    /// match every category entry. `on_violation(node, prev)` is called for
    /// every regression, `prev` being the preceding element.
    pub fn validate_order<F>(
        dom: &DomTree,
        children: &[NodeId],
        rules: Option<&[Term]>,
        mut on_violation: F,
    ) -> bool
    where
        F: FnMut(NodeId, NodeId),
    {
        let Some(rules) = rules else { return true };
        let mut valid = true;
        let mut index = 0;
        let mut prev: Option<NodeId> = None;

        for &node in children {
            let Some(element) = dom.element(node) else {
                continue;
            };
            let meta = element.meta.as_deref();
            let matches = |term: &Term| term.matches(&element.tag_name, meta, true);

            let old = index;
            while index < rules.len() && !matches(&rules[index]) {
                index += 1;
            }
            if index >= rules.len() {
                if rules.iter().any(matches) {
                    valid = false;
                    if let Some(prev) = prev {
                        on_violation(node, prev);
                    }
                }
                index = old;
            }
            prev = Some(node);
        }

        valid
    }

    /// Children of `node` that are validated as children of `node`'s parent.
    #[must_use]
    pub fn transparent_children(dom: &DomTree, node: NodeId) -> Vec<NodeId> {
        let Some(meta) = dom.element(node).and_then(|el| el.meta.clone()) else {
            return Vec::new();
        };
        match &meta.transparent {
            Transparent::No => Vec::new(),
            Transparent::All => dom.child_elements(node),
            Transparent::Only(terms) => dom
                .child_elements(node)
                .into_iter()
                .filter(|child| {
                    dom.element(*child).is_some_and(|el| {
                        terms
                            .iter()
                            .any(|t| t.matches(&el.tag_name, el.meta.as_deref(), false))
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlElement;
    use crate::meta::MetaTable;
    use crate::types::Location;

    fn build(table: &MetaTable, parent: &str, children: &[&str]) -> (DomTree, NodeId, Vec<NodeId>) {
        let mut dom = DomTree::new(Location::default());
        let p = dom.create_element(
            NodeId::ROOT,
            HtmlElement::new(parent, Location::default(), table.get(parent)),
        );
        let ids = children
            .iter()
            .map(|tag| dom.create_element(p, HtmlElement::new(*tag, Location::default(), table.get(tag))))
            .collect();
        (dom, p, ids)
    }

    #[test]
    fn permitted_uses_parent_rules() {
        let table = MetaTable::html5().unwrap();
        let (dom, ul, children) = build(&table, "ul", &["li", "div"]);
        let rules = table.get("ul").unwrap();
        assert_eq!(dom.tag_name(ul), "ul");
        assert!(Validator::validate_permitted(&dom, children[0], rules.permitted_content.as_ref()));
        assert!(!Validator::validate_permitted(&dom, children[1], rules.permitted_content.as_ref()));
        assert!(Validator::validate_permitted(&dom, children[1], None));
    }

    #[test]
    fn occurrences_limit_optional_terms() {
        let table = MetaTable::html5().unwrap();
        let (dom, _, children) = build(&table, "html", &["head", "head"]);
        let rules = table.get("html").unwrap();
        assert!(Validator::validate_occurrences(&dom, children[0], rules.permitted_content.as_ref(), 1));
        assert!(!Validator::validate_occurrences(&dom, children[0], rules.permitted_content.as_ref(), 2));
    }

    #[test]
    fn order_reports_each_regression() {
        let table = MetaTable::html5().unwrap();
        let (dom, _, children) = build(&table, "html", &["body", "head", "body", "head"]);
        let rules = table.get("html").unwrap();
        let mut violations = Vec::new();
        let valid = Validator::validate_order(
            &dom,
            &children,
            rules.permitted_order.as_deref(),
            |node, prev| violations.push((node, prev)),
        );
        assert!(!valid);
        assert_eq!(
            violations,
            vec![(children[1], children[0]), (children[3], children[2])]
        );
    }

    #[test]
    fn order_treats_unknown_elements_as_any_category() {
        let table = MetaTable::html5().unwrap();
        let (dom, details, children) = build(&table, "details", &["my-widget", "summary"]);
        let rules = table.get("details").unwrap();
        let mut violations = Vec::new();
        let valid = Validator::validate_order(
            &dom,
            &dom.child_elements(details),
            rules.permitted_order.as_deref(),
            |node, prev| violations.push((node, prev)),
        );
        assert!(!valid);
        assert_eq!(violations, vec![(children[1], children[0])]);
    }

    #[test]
    fn transparent_children_follow_terms() {
        let table = MetaTable::from_toml(
            "[w]\ntransparent = [\"@flow\"]\n[d]\nflow = true\n[t]\nmetadata = true",
        )
        .unwrap();
        let (dom, w, children) = build(&table, "w", &["d", "t"]);
        assert_eq!(Validator::transparent_children(&dom, w), vec![children[0]]);
    }

    #[test]
    fn nested_transparent_children_reach_the_leaf() {
        let table = MetaTable::html5().unwrap();
        let (mut dom, a, children) = build(&table, "a", &["del"]);
        let del = children[0];
        let div = dom.create_element(del, HtmlElement::new("div", Location::default(), table.get("div")));

        assert_eq!(Validator::transparent_children(&dom, a), vec![del]);
        assert_eq!(Validator::transparent_children(&dom, del), vec![div]);
        let span = table.get("span").unwrap();
        assert!(Validator::validate_permitted(&dom, del, span.permitted_content.as_ref()));
        assert!(!Validator::validate_permitted(&dom, div, span.permitted_content.as_ref()));
    }
}
