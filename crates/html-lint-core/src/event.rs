//! Parser events and the listener registry used to dispatch them.

use serde_json::{json, Value};
use std::fmt;

use crate::blocker::RuleBlocker;
use crate::dom::{DomTree, NodeId};
use crate::types::Location;

/// Closed set of event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Configuration is resolved, before parsing.
    ConfigReady,
    /// A source is about to be parsed.
    SourceReady,
    /// Parsing begins.
    ParseBegin,
    /// Parsing finished.
    ParseEnd,
    /// The document root exists, before any tag.
    DomLoad,
    /// The tree is complete.
    DomReady,
    /// A start tag was opened.
    TagStart,
    /// A start tag and its attributes were parsed.
    TagReady,
    /// An element was closed.
    TagEnd,
    /// An element and all its children are known.
    ElementReady,
    /// An attribute was parsed.
    Attr,
    /// Whitespace between tags.
    Whitespace,
    /// A doctype declaration.
    Doctype,
    /// A directive comment.
    Directive,
    /// A rule reported an error.
    RuleError,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 15] = [
        Self::ConfigReady,
        Self::SourceReady,
        Self::ParseBegin,
        Self::ParseEnd,
        Self::DomLoad,
        Self::DomReady,
        Self::TagStart,
        Self::TagReady,
        Self::TagEnd,
        Self::ElementReady,
        Self::Attr,
        Self::Whitespace,
        Self::Doctype,
        Self::Directive,
        Self::RuleError,
    ];

    /// Event name as used in dumps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigReady => "config:ready",
            Self::SourceReady => "source:ready",
            Self::ParseBegin => "parse:begin",
            Self::ParseEnd => "parse:end",
            Self::DomLoad => "dom:load",
            Self::DomReady => "dom:ready",
            Self::TagStart => "tag:start",
            Self::TagReady => "tag:ready",
            Self::TagEnd => "tag:end",
            Self::ElementReady => "element:ready",
            Self::Attr => "attr",
            Self::Whitespace => "whitespace",
            Self::Doctype => "doctype",
            Self::Directive => "directive",
            Self::RuleError => "rule:error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEvent {
    /// Element the attribute belongs to.
    pub target: NodeId,
    /// Attribute name.
    pub key: String,
    /// Value without quotes.
    pub value: Option<String>,
    /// Quote character, if any.
    pub quote: Option<char>,
    /// Name of the attribute this one was synthesized from.
    pub original_attribute: Option<String>,
    /// Location of the name.
    pub location: Location,
    /// Location of the value.
    pub value_location: Option<Location>,
}

/// Directive event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveEvent {
    /// Action, e.g. `disable-next`.
    pub action: String,
    /// Raw rule list.
    pub data: String,
    /// Free-form text after `:`.
    pub comment: String,
    /// Location of the whole comment.
    pub location: Location,
    /// Location of the action.
    pub action_location: Location,
    /// Location of the rule list.
    pub options_location: Location,
    /// Location of the free-form comment.
    pub comment_location: Option<Location>,
}

impl DirectiveEvent {
    /// Rule ids from the comma- or whitespace-separated list.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&str> {
        self.data
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// `rule:error` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleErrorEvent {
    /// Reporting rule.
    pub rule_id: String,
    /// Whether the report would be written if unblocked.
    pub enabled: bool,
    /// Blockers active for the report.
    pub blockers: Vec<RuleBlocker>,
    /// Location of the report.
    pub location: Location,
}

/// An event emitted while linting a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `config:ready`
    ConfigReady {
        /// Zero-width location at the start of the source.
        location: Location,
    },
    /// `source:ready`
    SourceReady {
        /// Zero-width location at the start of the source.
        location: Location,
    },
    /// `parse:begin`
    ParseBegin {
        /// Zero-width location at the start of the source.
        location: Location,
    },
    /// `parse:end`
    ParseEnd {
        /// Location of the end of input.
        location: Location,
    },
    /// `dom:load`
    DomLoad {
        /// Zero-width location at the start of the source.
        location: Location,
    },
    /// `dom:ready`
    DomReady {
        /// Location of the end of input.
        location: Location,
    },
    /// `tag:start`
    TagStart {
        /// New element.
        target: NodeId,
        /// Location of the tag name.
        location: Location,
    },
    /// `tag:ready`
    TagReady {
        /// Element whose start tag is complete.
        target: NodeId,
        /// Location of the tag name.
        location: Location,
    },
    /// `tag:end`
    TagEnd {
        /// End tag node, `None` when closed by end of document.
        target: Option<NodeId>,
        /// Element being closed, `None` for a stray end tag.
        previous: Option<NodeId>,
        /// Location of the end tag (or end of input).
        location: Location,
    },
    /// `element:ready`
    ElementReady {
        /// Completed element.
        target: NodeId,
        /// Location of the element.
        location: Location,
    },
    /// `attr`
    Attr(AttributeEvent),
    /// `whitespace`
    Whitespace {
        /// Raw whitespace.
        text: String,
        /// Location of the whitespace.
        location: Location,
    },
    /// `doctype`
    Doctype {
        /// Doctype keyword as written.
        tag: String,
        /// Doctype value, e.g. `html`.
        value: String,
        /// Location of the value.
        value_location: Location,
        /// Location of the declaration.
        location: Location,
    },
    /// `directive`
    Directive(DirectiveEvent),
    /// `rule:error`
    RuleError(RuleErrorEvent),
}

impl Event {
    /// Kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ConfigReady { .. } => EventKind::ConfigReady,
            Self::SourceReady { .. } => EventKind::SourceReady,
            Self::ParseBegin { .. } => EventKind::ParseBegin,
            Self::ParseEnd { .. } => EventKind::ParseEnd,
            Self::DomLoad { .. } => EventKind::DomLoad,
            Self::DomReady { .. } => EventKind::DomReady,
            Self::TagStart { .. } => EventKind::TagStart,
            Self::TagReady { .. } => EventKind::TagReady,
            Self::TagEnd { .. } => EventKind::TagEnd,
            Self::ElementReady { .. } => EventKind::ElementReady,
            Self::Attr(_) => EventKind::Attr,
            Self::Whitespace { .. } => EventKind::Whitespace,
            Self::Doctype { .. } => EventKind::Doctype,
            Self::Directive(_) => EventKind::Directive,
            Self::RuleError(_) => EventKind::RuleError,
        }
    }

    /// Location of this event.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::ConfigReady { location }
            | Self::SourceReady { location }
            | Self::ParseBegin { location }
            | Self::ParseEnd { location }
            | Self::DomLoad { location }
            | Self::DomReady { location }
            | Self::TagStart { location, .. }
            | Self::TagReady { location, .. }
            | Self::TagEnd { location, .. }
            | Self::ElementReady { location, .. }
            | Self::Whitespace { location, .. }
            | Self::Doctype { location, .. } => location,
            Self::Attr(attr) => &attr.location,
            Self::Directive(directive) => &directive.location,
            Self::RuleError(error) => &error.location,
        }
    }

    /// JSON view of the event for debug dumps.
    #[must_use]
    pub fn describe(&self, dom: &DomTree) -> Value {
        let node = |id: &NodeId| Value::String(dom.tag_name(*id).to_owned());
        let opt_node = |id: &Option<NodeId>| id.as_ref().map_or(Value::Null, node);
        let location = self.location().to_string();

        match self {
            Self::TagStart { target, .. }
            | Self::TagReady { target, .. }
            | Self::ElementReady { target, .. } => {
                json!({ "location": location, "target": node(target) })
            }
            Self::TagEnd {
                target, previous, ..
            } => json!({
                "location": location,
                "target": opt_node(target),
                "previous": opt_node(previous),
            }),
            Self::Attr(attr) => json!({
                "location": location,
                "target": node(&attr.target),
                "key": attr.key,
                "value": attr.value,
                "originalAttribute": attr.original_attribute,
            }),
            Self::Whitespace { text, .. } => json!({ "location": location, "text": text }),
            Self::Doctype { tag, value, .. } => {
                json!({ "location": location, "tag": tag, "value": value })
            }
            Self::Directive(d) => json!({
                "location": location,
                "action": d.action,
                "data": d.data,
                "comment": d.comment,
            }),
            Self::RuleError(e) => json!({
                "location": location,
                "ruleId": e.rule_id,
                "enabled": e.enabled,
                "blockers": e.blockers.iter().map(|b| b.0).collect::<Vec<_>>(),
            }),
            _ => json!({ "location": location }),
        }
    }
}

/// Handle returned when subscribing; pass to [`EventHandler::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: ListenerId,
    /// `None` subscribes to every event.
    kinds: Option<Vec<EventKind>>,
    once: bool,
    value: T,
}

/// Publish/subscribe registry keyed by [`EventKind`].
///
/// Listeners are plain values (usually small enums naming what to run);
/// the caller performs the actual dispatch. Wildcard and specific
/// listeners share one registration order.
#[derive(Debug, Clone)]
pub struct EventHandler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for EventHandler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> EventHandler<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, kinds: Option<Vec<EventKind>>, once: bool, value: T) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kinds,
            once,
            value,
        });
        id
    }

    /// Subscribes to the given kinds.
    pub fn on(&mut self, kinds: &[EventKind], value: T) -> ListenerId {
        self.register(Some(kinds.to_vec()), false, value)
    }

    /// Subscribes to the first event of any of the given kinds.
    pub fn once(&mut self, kinds: &[EventKind], value: T) -> ListenerId {
        self.register(Some(kinds.to_vec()), true, value)
    }

    /// Subscribes to every event.
    pub fn on_any(&mut self, value: T) -> ListenerId {
        self.register(None, false, value)
    }

    /// Unsubscribes. Returns false if the listener was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Snapshot of the listeners for `kind`, in registration order.
    #[must_use]
    pub fn listeners(&self, kind: EventKind) -> Vec<(ListenerId, T)> {
        self.entries
            .iter()
            .filter(|entry| entry.kinds.as_ref().map_or(true, |k| k.contains(&kind)))
            .map(|entry| (entry.id, entry.value.clone()))
            .collect()
    }

    /// Marks a snapshotted listener as about to run.
    ///
    /// Returns false if it was removed since the snapshot was taken. A
    /// `once` listener is removed by claiming it.
    pub fn claim(&mut self, id: ListenerId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        if self.entries[index].once {
            self.entries.remove(index);
        }
        true
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
