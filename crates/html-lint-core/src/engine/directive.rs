//! Directive comments: `enable`, `disable`, `disable-block` and
//! `disable-next`.

use tracing::debug;

use super::session::{Listener, Session};
use super::NO_UNUSED_DISABLE;
use crate::blocker::RuleBlocker;
use crate::dom::{DomTree, NodeId};
use crate::event::{DirectiveEvent, Event, EventKind, ListenerId};
use crate::rule::RuleReport;
use crate::types::{Location, Severity};

/// A rule id from a directive together with its location.
#[derive(Debug, Clone)]
struct RuleRef {
    id: String,
    location: Location,
}

/// Splits the rule list of a directive into ids with their locations.
fn rule_refs(directive: &DirectiveEvent) -> Vec<RuleRef> {
    let data = directive.data.as_str();
    let mut refs = Vec::new();
    let mut start = None;
    for (i, ch) in data.char_indices().chain(std::iter::once((data.len(), ','))) {
        let separator = ch == ',' || ch.is_whitespace();
        match (start, separator) {
            (None, false) => start = Some(i),
            (Some(begin), true) => {
                refs.push(RuleRef {
                    id: data[begin..i].to_owned(),
                    location: directive.options_location.slice(begin, Some(i), Some(data)),
                });
                start = None;
            }
            _ => {}
        }
    }
    refs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extent {
    /// Until the parent of the first following element is closed.
    Block { owner: Option<NodeId> },
    /// Until the first `tag:ready`, `tag:end` or `attr` event.
    Next,
}

#[derive(Debug)]
enum ScopeKind {
    /// Marks every following element with the rule toggled.
    Toggle { enable: bool },
    Blocked {
        blocker: RuleBlocker,
        extent: Extent,
        /// An element was opened inside the scope.
        opened: bool,
        /// Blocker lifted; usage is still tracked until `parse:end`.
        ended: bool,
        unused: Vec<RuleRef>,
    },
}

/// State of one directive comment.
#[derive(Debug)]
pub(super) struct Scope {
    rules: Vec<String>,
    kind: ScopeKind,
    listeners: Vec<ListenerId>,
    closed: bool,
}

impl Session<'_> {
    pub(super) fn process_directive(&mut self, directive: &DirectiveEvent) {
        let refs = rule_refs(directive);
        let rules: Vec<String> = refs.iter().map(|r| r.id.clone()).collect();
        debug!("Directive {} {:?} at {}", directive.action, rules, directive.location);

        match directive.action.as_str() {
            "enable" => {
                for slot in self.rules.iter_mut().filter(|s| rules.contains(&s.name)) {
                    slot.state.enabled = true;
                    if slot.state.severity == Severity::Disabled {
                        slot.state.severity = Severity::Error;
                    }
                }
                self.add_scope(rules, ScopeKind::Toggle { enable: true }, |handler, listener| {
                    vec![handler.on(&[EventKind::TagStart], listener)]
                });
            }
            "disable" => {
                for slot in self.rules.iter_mut().filter(|s| rules.contains(&s.name)) {
                    slot.state.enabled = false;
                }
                self.add_scope(rules, ScopeKind::Toggle { enable: false }, |handler, listener| {
                    vec![handler.on(&[EventKind::TagStart], listener)]
                });
            }
            "disable-block" => {
                let blocker = self.block(&rules);
                let kind = ScopeKind::Blocked {
                    blocker,
                    extent: Extent::Block { owner: None },
                    opened: false,
                    ended: false,
                    unused: refs,
                };
                self.add_scope(rules, kind, |handler, listener| {
                    vec![handler.on(
                        &[
                            EventKind::TagStart,
                            EventKind::TagEnd,
                            EventKind::RuleError,
                            EventKind::ParseEnd,
                        ],
                        listener,
                    )]
                });
            }
            "disable-next" => {
                let blocker = self.block(&rules);
                let kind = ScopeKind::Blocked {
                    blocker,
                    extent: Extent::Next,
                    opened: false,
                    ended: false,
                    unused: refs,
                };
                self.add_scope(rules, kind, |handler, listener| {
                    vec![
                        handler.once(&[EventKind::TagStart], listener),
                        handler.once(
                            &[EventKind::TagReady, EventKind::TagEnd, EventKind::Attr],
                            listener,
                        ),
                        handler.on(&[EventKind::RuleError, EventKind::ParseEnd], listener),
                    ]
                });
            }
            action => self.report_error(
                format!("Unknown directive \"{action}\""),
                directive.action_location.clone(),
            ),
        }
    }

    fn block(&mut self, rules: &[String]) -> RuleBlocker {
        let blocker = self.blockers.create();
        for slot in self.rules.iter_mut().filter(|s| rules.contains(&s.name)) {
            slot.state.block(blocker);
        }
        blocker
    }

    fn add_scope<F>(&mut self, rules: Vec<String>, kind: ScopeKind, subscribe: F)
    where
        F: FnOnce(&mut crate::event::EventHandler<Listener>, Listener) -> Vec<ListenerId>,
    {
        let index = self.scopes.len();
        let listeners = subscribe(&mut self.handler, Listener::Scope(index));
        self.scopes.push(Scope {
            rules,
            kind,
            listeners,
            closed: false,
        });
    }

    pub(super) fn scope_event(&mut self, index: usize, event: &Event, dom: &DomTree) {
        let Some(scope) = self.scopes.get_mut(index) else {
            return;
        };
        if scope.closed {
            return;
        }

        let mut end = false;
        let mut finish = false;
        match &mut scope.kind {
            ScopeKind::Toggle { enable } => {
                if let Event::TagStart { target, .. } = event {
                    for rule in &scope.rules {
                        if *enable {
                            self.annotations.enable_rule(*target, rule);
                        } else {
                            self.annotations.disable_rule(*target, rule);
                        }
                    }
                }
            }
            ScopeKind::Blocked {
                blocker,
                extent,
                opened,
                ended,
                unused,
            } => match event {
                Event::TagStart { target, .. } if !*ended => {
                    if let Extent::Block { owner } = extent {
                        if owner.is_none() {
                            *owner = Some(dom.parent(*target).unwrap_or(NodeId::ROOT));
                        }
                    }
                    *opened = true;
                    for rule in &scope.rules {
                        self.annotations.block_rule(*target, rule, *blocker);
                    }
                }
                Event::RuleError(error) => {
                    if error.blockers.contains(blocker) {
                        unused.retain(|r| r.id != error.rule_id);
                    }
                }
                Event::TagEnd { previous, .. } if !*ended => match extent {
                    Extent::Block { owner } => {
                        end = owner.is_none() || *previous == *owner;
                    }
                    Extent::Next => {
                        *ended = true;
                        self.deferred.push(index);
                    }
                },
                Event::TagReady { .. } | Event::Attr(_) => {
                    if *extent == Extent::Next && !*ended {
                        *ended = true;
                        self.deferred.push(index);
                    }
                }
                Event::ParseEnd { .. } => finish = true,
                _ => {}
            },
        }

        if end {
            self.end_scope(index);
        }
        if finish {
            self.close_scope(index, dom);
        }
    }

    /// Lifts the blocker of a scope without unsubscribing it.
    ///
    /// Elements already annotated stay blocked, and `rule:error` events
    /// carrying the blocker still count as usage until `parse:end`.
    pub(super) fn end_scope(&mut self, index: usize) {
        let Some(Scope {
            kind: ScopeKind::Blocked { blocker, ended, .. },
            ..
        }) = self.scopes.get_mut(index)
        else {
            return;
        };
        *ended = true;
        let blocker = *blocker;
        for slot in &mut self.rules {
            slot.state.unblock(blocker);
        }
    }

    /// Unsubscribes a scope at `parse:end` and reports unused rules.
    pub(super) fn close_scope(&mut self, index: usize, dom: &DomTree) {
        let Some(scope) = self.scopes.get_mut(index) else {
            return;
        };
        if scope.closed {
            return;
        }
        scope.closed = true;
        let listeners = std::mem::take(&mut scope.listeners);
        let (blocker, unused) = match &mut scope.kind {
            ScopeKind::Toggle { .. } => (None, Vec::new()),
            ScopeKind::Blocked {
                blocker,
                opened,
                unused,
                ..
            } => {
                let unused = if *opened {
                    std::mem::take(unused)
                } else {
                    Vec::new()
                };
                (Some(*blocker), unused)
            }
        };
        let covers_self = scope.rules.iter().any(|r| r == NO_UNUSED_DISABLE);

        for id in listeners {
            self.handler.off(id);
        }
        if let Some(blocker) = blocker {
            for slot in &mut self.rules {
                slot.state.unblock(blocker);
            }
        }

        if covers_self || unused.is_empty() {
            return;
        }
        let Some(reporter) = self.rule_index(NO_UNUSED_DISABLE) else {
            return;
        };
        let state = &self.rules[reporter].state;
        let reports = unused
            .into_iter()
            .map(|rule| RuleReport {
                node: None,
                message: format!("\"{}\" rule is disabled but no error was reported", rule.id),
                location: rule.location,
                context: None,
                enabled: state.is_enabled(),
                blockers: state.blockers.clone(),
            })
            .collect();
        self.emit_reports(reporter, reports, dom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_refs_locate_each_id() {
        let directive = DirectiveEvent {
            action: "disable-next".to_owned(),
            data: "foo, bar baz".to_owned(),
            comment: String::new(),
            location: Location::new("f", 0, 1, 1, 40),
            action_location: Location::new("f", 19, 1, 20, 12),
            options_location: Location::new("f", 32, 1, 33, 12),
            comment_location: None,
        };
        let refs = rule_refs(&directive);
        let ids: Vec<_> = refs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["foo", "bar", "baz"]);
        let columns: Vec<_> = refs.iter().map(|r| (r.location.column, r.location.size)).collect();
        assert_eq!(columns, vec![(33, 3), (38, 3), (42, 3)]);
    }
}
