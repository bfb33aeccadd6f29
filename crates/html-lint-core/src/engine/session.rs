//! Per-source rule instances and event dispatch.

use tracing::debug;

use super::directive::Scope;
use super::{EventDump, PARSER_ERROR};
use crate::blocker::{BlockerSource, NodeAnnotations, RuleState};
use crate::dom::DomTree;
use crate::event::{Event, EventHandler, EventKind, RuleErrorEvent};
use crate::parser::EventSink;
use crate::reporter::{DeferredMessage, Reporter};
use crate::rule::{RuleBox, RuleContext, RuleReport};
use crate::types::{Location, Severity};

/// One configured rule, instantiated for a single source.
pub(super) struct RuleSlot {
    pub(super) name: String,
    pub(super) url: Option<&'static str>,
    pub(super) rule: RuleBox,
    pub(super) state: RuleState,
}

impl RuleSlot {
    pub(super) fn new(name: &str, rule: RuleBox, severity: Severity) -> Self {
        Self {
            name: name.to_owned(),
            url: rule.url(),
            rule,
            state: RuleState::new(severity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Listener {
    Rule(usize),
    Directive,
    Scope(usize),
    Record,
}

/// Event bus, rule instances and directive state for one source.
pub(super) struct Session<'r> {
    pub(super) filename: String,
    pub(super) rules: Vec<RuleSlot>,
    pub(super) handler: EventHandler<Listener>,
    pub(super) annotations: NodeAnnotations,
    pub(super) blockers: BlockerSource,
    pub(super) scopes: Vec<Scope>,
    /// Scopes to end once the outermost dispatch returns.
    pub(super) deferred: Vec<usize>,
    depth: usize,
    recorded: Vec<EventDump>,
    reporter: &'r mut Reporter,
}

impl<'r> Session<'r> {
    pub(super) fn new(filename: &str, rules: Vec<RuleSlot>, reporter: &'r mut Reporter) -> Self {
        let mut handler = EventHandler::new();
        for (index, slot) in rules.iter().enumerate() {
            handler.on(slot.rule.events(), Listener::Rule(index));
        }
        Self {
            filename: filename.to_owned(),
            rules,
            handler,
            annotations: NodeAnnotations::new(),
            blockers: BlockerSource::new(),
            scopes: Vec::new(),
            deferred: Vec::new(),
            depth: 0,
            recorded: Vec::new(),
            reporter,
        }
    }

    /// Starts handling directive comments.
    pub(super) fn listen_directives(&mut self) {
        self.handler.on(&[EventKind::Directive], Listener::Directive);
    }

    /// Records every event from now on.
    pub(super) fn record_events(&mut self) {
        self.handler.on_any(Listener::Record);
    }

    pub(super) fn into_recorded(self) -> Vec<EventDump> {
        self.recorded
    }

    pub(super) fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|slot| slot.name == name)
    }

    /// Writes an engine-level error, bypassing rule state.
    pub(super) fn report_error(&mut self, message: String, location: Location) {
        let message = DeferredMessage::new(PARSER_ERROR, Severity::Error, message, location);
        self.reporter.add_manual(&self.filename, message);
    }

    /// Announces reports through `rule:error` and writes the unblocked ones.
    pub(super) fn emit_reports(&mut self, index: usize, reports: Vec<RuleReport>, dom: &DomTree) {
        for report in reports {
            let error = Event::RuleError(RuleErrorEvent {
                rule_id: self.rules[index].name.clone(),
                enabled: report.enabled,
                blockers: report.blockers.clone(),
                location: report.location.clone(),
            });
            self.trigger(&error, dom);

            if report.enabled && report.blockers.is_empty() {
                let slot = &self.rules[index];
                let message = DeferredMessage::new(
                    &slot.name,
                    slot.state.severity,
                    report.message,
                    report.location,
                )
                .with_node(report.node)
                .with_url(slot.url)
                .with_context(report.context);
                self.reporter.add_manual(&self.filename, message);
            }
        }
    }

    fn run_rule(&mut self, index: usize, event: &Event, dom: &DomTree) {
        let slot = &mut self.rules[index];
        let mut ctx = RuleContext::new(&slot.name, dom, &slot.state, &self.annotations);
        slot.rule.handle(event, &mut ctx);
        let reports = ctx.into_reports();
        if !reports.is_empty() {
            debug!("{} reported {} problem(s)", self.rules[index].name, reports.len());
            self.emit_reports(index, reports, dom);
        }
    }

    fn run_deferred(&mut self) {
        for scope in std::mem::take(&mut self.deferred) {
            self.end_scope(scope);
        }
    }

    /// Resolves selectors of everything reported for this source.
    pub(super) fn finish(self, dom: &DomTree) {
        self.reporter.freeze(&self.filename, dom);
    }
}

impl EventSink for Session<'_> {
    fn trigger(&mut self, event: &Event, dom: &DomTree) {
        self.depth += 1;
        for (id, listener) in self.handler.listeners(event.kind()) {
            if !self.handler.claim(id) {
                continue;
            }
            match listener {
                Listener::Rule(index) => self.run_rule(index, event, dom),
                Listener::Directive => {
                    if let Event::Directive(directive) = event {
                        self.process_directive(directive);
                    }
                }
                Listener::Scope(index) => self.scope_event(index, event, dom),
                Listener::Record => self.recorded.push(EventDump {
                    event: event.kind().as_str().to_owned(),
                    data: event.describe(dom),
                }),
            }
        }
        self.depth -= 1;

        if self.depth == 0 && !self.deferred.is_empty() {
            self.run_deferred();
        }
    }
}
