//! Arena-based document tree.
//!
//! Nodes live in one vector and refer to each other by [`NodeId`]. A node
//! owns its `children` list; `parent` is a plain index back-reference.
//! The parser also keeps the stack of open elements here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::meta::MetaElement;
use crate::types::Location;

/// Index of a node in a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document root is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// How an element was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClosed {
    /// Still open, or left open at end of document.
    Open,
    /// Closed by a matching end tag.
    EndTag,
    /// Void element without `/>`.
    VoidOmitted,
    /// Self-closed with `/>`.
    VoidSelfClosed,
    /// Closed by another tag (optional end tag or mismatched end tag).
    Implicit,
}

/// Attribute as produced by the lexer or a transformer hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// Attribute name as written.
    pub key: String,
    /// Value without quotes, `None` for boolean attributes.
    pub value: Option<String>,
    /// Quote character used, if any.
    pub quote: Option<char>,
    /// Name of the attribute this one was synthesized from.
    pub original_attribute: Option<String>,
}

/// Attribute attached to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written.
    pub key: String,
    /// Value without quotes.
    pub value: Option<String>,
    /// Quote character used, if any.
    pub quote: Option<char>,
    /// Location of the name.
    pub key_location: Location,
    /// Location of the value (without quotes).
    pub value_location: Option<Location>,
    /// Name of the attribute this one was synthesized from.
    pub original_attribute: Option<String>,
}

/// Element data.
#[derive(Debug, Clone)]
pub struct HtmlElement {
    /// Tag name as written.
    pub tag_name: String,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Location of the start tag name (or end tag name for end tag nodes).
    pub location: Location,
    /// Closing state.
    pub closed: NodeClosed,
    /// Element metadata, `None` for unknown elements.
    pub meta: Option<Arc<MetaElement>>,
}

impl HtmlElement {
    /// Creates an element with no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, location: Location, meta: Option<Arc<MetaElement>>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: Vec::new(),
            location,
            closed: NodeClosed::Open,
            meta,
        }
    }

    /// First attribute named `key` (case-insensitive).
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.key.eq_ignore_ascii_case(key))
    }

    /// Value of the `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").and_then(|attr| attr.value.as_deref())
    }

    /// Whitespace-separated entries of the `class` attribute.
    #[must_use]
    pub fn class_list(&self) -> Vec<&str> {
        self.attribute("class")
            .and_then(|attr| attr.value.as_deref())
            .map(|value| value.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// True for elements whose metadata marks them void.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.meta.as_ref().is_some_and(|meta| meta.void)
    }
}

/// Character data.
#[derive(Debug, Clone)]
pub struct TextNode {
    /// Raw text.
    pub text: String,
    /// Location of the text.
    pub location: Location,
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Element (including the document root).
    Element(HtmlElement),
    /// Text or whitespace.
    Text(TextNode),
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct DomNode {
    /// Parent element, `None` for the root and detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// Payload.
    pub data: NodeData,
}

/// The document tree plus the stack of open elements.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    active: Vec<NodeId>,
}

/// Tag name of the document root.
pub const ROOT_TAG: &str = "#document";

impl DomTree {
    /// Creates a tree containing only the root.
    #[must_use]
    pub fn new(location: Location) -> Self {
        let mut root = HtmlElement::new(ROOT_TAG, location, None);
        root.closed = NodeClosed::EndTag;
        Self {
            nodes: vec![DomNode {
                parent: None,
                children: Vec::new(),
                data: NodeData::Element(root),
            }],
            active: vec![NodeId::ROOT],
        }
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes, detached end-tag nodes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Element data by id, `None` for text nodes.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&HtmlElement> {
        match &self.get(id)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Mutable element data by id.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut HtmlElement> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Tag name of an element, `""` for text nodes.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> &str {
        self.element(id).map_or("", |el| el.tag_name.as_str())
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Children of a node (elements and text).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Element children of a node.
    #[must_use]
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    /// Ancestors from the parent up to and including the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Creates an element as the last child of `parent`.
    pub fn create_element(&mut self, parent: NodeId, element: HtmlElement) -> NodeId {
        let id = self.alloc(Some(parent), NodeData::Element(element));
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    /// Creates an element outside the tree (used for end tags).
    pub fn create_detached(&mut self, element: HtmlElement) -> NodeId {
        self.alloc(None, NodeData::Element(element))
    }

    /// Attaches a detached node as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    /// Appends character data to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str, location: Location) -> NodeId {
        let id = self.alloc(
            Some(parent),
            NodeData::Text(TextNode {
                text: text.to_owned(),
                location,
            }),
        );
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    fn alloc(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            parent,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Innermost open element (the root when nothing else is open).
    #[must_use]
    pub fn active(&self) -> NodeId {
        self.active.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Open elements from the root to the innermost.
    #[must_use]
    pub fn open_elements(&self) -> &[NodeId] {
        &self.active
    }

    /// Pushes an element onto the open stack.
    pub fn push_active(&mut self, id: NodeId) {
        self.active.push(id);
    }

    /// Pops the innermost open element. The root is never popped.
    pub fn pop_active(&mut self) -> Option<NodeId> {
        if self.active.len() > 1 {
            self.active.pop()
        } else {
            None
        }
    }

    /// Innermost open element named `tag_name` (case-insensitive), root excluded.
    #[must_use]
    pub fn find_open(&self, tag_name: &str) -> Option<NodeId> {
        self.active
            .iter()
            .skip(1)
            .rev()
            .copied()
            .find(|id| self.tag_name(*id).eq_ignore_ascii_case(tag_name))
    }

    /// Depth-first, pre-order list of elements below `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_elements(id).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.child_elements(node).into_iter().rev());
        }
        out
    }

    /// All elements with the given `id` attribute.
    #[must_use]
    pub fn elements_with_id(&self, id: &str) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|node| self.element(*node).and_then(HtmlElement::id) == Some(id))
            .collect()
    }

    /// CSS-like selector uniquely identifying an element.
    ///
    /// Walks from the element to the root. An ancestor-or-self with an `id`
    /// unique in the document ends the walk as `#id`; other steps use the
    /// lowercased tag name with `:nth-child(n)` when siblings share it.
    #[must_use]
    pub fn generate_selector(&self, id: NodeId) -> Option<String> {
        if id == NodeId::ROOT || self.parent(id).is_none() {
            return None;
        }

        let mut id_counts: HashMap<&str, usize> = HashMap::new();
        for node in self.descendants(NodeId::ROOT) {
            if let Some(value) = self.element(node).and_then(HtmlElement::id) {
                *id_counts.entry(value).or_default() += 1;
            }
        }

        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.filter(|n| *n != NodeId::ROOT) {
            let element = self.element(node)?;
            if let Some(value) = element.id() {
                if id_counts.get(value) == Some(&1) && !value.contains(char::is_whitespace) {
                    parts.push(format!("#{value}"));
                    break;
                }
            }

            let tag = element.tag_name.to_lowercase();
            let parent = self.parent(node);
            let siblings: Vec<NodeId> = parent
                .map(|p| self.child_elements(p))
                .unwrap_or_default()
                .into_iter()
                .filter(|sibling| self.tag_name(*sibling).eq_ignore_ascii_case(&tag))
                .collect();
            if siblings.len() > 1 {
                let index = self
                    .child_elements(parent.unwrap_or(NodeId::ROOT))
                    .iter()
                    .position(|sibling| *sibling == node)
                    .map_or(1, |i| i + 1);
                parts.push(format!("{tag}:nth-child({index})"));
            } else {
                parts.push(tag);
            }
            current = parent;
        }

        parts.reverse();
        Some(parts.join(" > "))
    }
}
