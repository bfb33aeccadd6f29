//! Orchestrates linting: rule instantiation, event dispatch, directives
//! and reporting.

mod builtin;
mod directive;
mod session;

pub use builtin::{builtin_rules, NoUnusedDisable};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ResolvedConfig;
use crate::dom::{DomTree, NodeId};
use crate::error::{EngineError, InvalidTokenError, ParseError, Result};
use crate::event::Event;
use crate::lexer::tokenize;
use crate::parser::{EventSink, Parser};
use crate::reporter::{Report, Reporter};
use crate::rule::RuleRegistry;
use crate::types::{Location, Source};

use session::{RuleSlot, Session};

/// Rule id of diagnostics raised for lexer and parser errors.
pub const PARSER_ERROR: &str = "parser-error";

/// Rule id of the engine-owned unused-directive rule.
pub const NO_UNUSED_DISABLE: &str = "no-unused-disable";

/// One token in a debug dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDump {
    /// Token type, e.g. `TAG_OPEN`.
    pub token: String,
    /// Consumed text.
    pub data: String,
    /// `file:line:col`.
    pub location: String,
}

/// One event in a debug dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDump {
    /// Event name, e.g. `tag:start`.
    pub event: String,
    /// Event payload.
    pub data: Value,
}

/// Lints sources against a resolved configuration.
///
/// Rule definitions are shared; every source gets fresh rule instances,
/// a fresh parser and a fresh event bus.
pub struct Engine {
    config: ResolvedConfig,
    registry: RuleRegistry,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

impl Engine {
    /// Creates an engine from a configuration and the bundled rules.
    ///
    /// Engine-owned rules come first, then `rules`, then the rules of each
    /// plugin in order; later registrations replace earlier ones. Every
    /// plugin's `init` is called once here.
    #[must_use]
    pub fn new(config: ResolvedConfig, rules: RuleRegistry) -> Self {
        let mut registry = builtin_rules();
        registry.merge(rules);
        for plugin in config.plugins() {
            debug!("Loading plugin: {}", plugin.name());
            plugin.init();
            registry.merge(plugin.rules());
        }
        Self { config, registry }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Every known rule definition.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Lints `sources` in order and returns the merged report.
    ///
    /// Lexer and parser errors become `parser-error` diagnostics; linting
    /// continues with the next source.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured rule rejects its options.
    pub fn lint(&self, sources: &[Source]) -> Result<Report> {
        info!("Starting lint of {} source(s)", sources.len());

        let mut reporter = Reporter::new();
        for source in sources {
            self.lint_source(source, &mut reporter)?;
        }
        let report = reporter.save(sources);

        info!(
            "Lint complete: {} errors, {} warnings in {} files",
            report.error_count,
            report.warning_count,
            report.results.len()
        );
        Ok(report)
    }

    fn lint_source(&self, source: &Source, reporter: &mut Reporter) -> Result<()> {
        debug!("Linting: {}", source.filename);

        let rules = self.instantiate_rules()?;
        let mut session = Session::new(&source.filename, rules, reporter);

        let start = Location::start_of(source);
        let empty = DomTree::new(start.clone());
        session.trigger(&Event::ConfigReady { location: start.clone() }, &empty);
        session.trigger(&Event::SourceReady { location: start }, &empty);
        session.listen_directives();

        let mut parser = Parser::new(self.config.meta_table());
        if let Err(err) = parser.parse_html(source, &mut session) {
            warn!("Failed to parse {}: {}", source.filename, err);
            session.report_error(err.message().to_owned(), err.location().clone());
        }
        session.finish(parser.dom());
        Ok(())
    }

    fn instantiate_rules(&self) -> Result<Vec<RuleSlot>> {
        let mut slots = Vec::with_capacity(self.config.rules().len());
        for (name, rule_config) in self.config.rules() {
            let rule = match self.registry.get(name) {
                Some(Some(factory)) => {
                    factory(&rule_config.options).map_err(|source| EngineError::RuleInit {
                        rule: name.clone(),
                        source,
                    })?
                }
                _ => {
                    warn!("Definition for rule '{}' was not found", name);
                    Box::new(builtin::MissingRule)
                }
            };
            slots.push(RuleSlot::new(name, rule, rule_config.severity));
        }
        Ok(slots)
    }

    /// Tokens of `source`.
    ///
    /// # Errors
    ///
    /// Returns the lexer error if tokenizing fails.
    pub fn dump_tokens(&self, source: &Source) -> std::result::Result<Vec<TokenDump>, InvalidTokenError> {
        tokenize(source)
            .map(|token| {
                token.map(|token| TokenDump {
                    token: token.kind.as_str().to_owned(),
                    data: token.text().to_owned(),
                    location: token.location.to_string(),
                })
            })
            .collect()
    }

    /// Events emitted while parsing `source`, without rules.
    ///
    /// # Errors
    ///
    /// Returns the parse error if parsing fails.
    pub fn dump_events(&self, source: &Source) -> std::result::Result<Vec<EventDump>, ParseError> {
        let mut reporter = Reporter::new();
        let mut session = Session::new(&source.filename, Vec::new(), &mut reporter);
        session.record_events();
        let mut parser = Parser::new(self.config.meta_table());
        parser.parse_html(source, &mut session)?;
        Ok(session.into_recorded())
    }

    /// Indented element tree of `source`.
    ///
    /// # Errors
    ///
    /// Returns the parse error if parsing fails.
    pub fn dump_tree(&self, source: &Source) -> std::result::Result<Vec<String>, ParseError> {
        let mut parser = Parser::new(self.config.meta_table());
        parser.parse_html(source, &mut |_: &Event, _: &DomTree| {})?;
        let dom = parser.into_dom();

        let mut lines = vec!["(root)".to_owned()];
        write_children(&dom, dom.root(), "", &mut lines);
        Ok(lines)
    }
}

fn decorate(dom: &DomTree, node: NodeId) -> String {
    let mut label = dom.tag_name(node).to_owned();
    if let Some(element) = dom.element(node) {
        if let Some(id) = element.id() {
            label.push('#');
            label.push_str(id);
        }
        for class in element.class_list() {
            label.push('.');
            label.push_str(class);
        }
    }
    label
}

fn write_children(dom: &DomTree, node: NodeId, indent: &str, lines: &mut Vec<String>) {
    let children = dom.child_elements(node);
    let last = children.len().saturating_sub(1);
    for (index, child) in children.into_iter().enumerate() {
        let branch = if index == last { "└" } else { "├" };
        let fork = if dom.child_elements(child).is_empty() { "─" } else { "┬" };
        lines.push(format!("{indent}{branch}─{fork} {}", decorate(dom, child)));
        let nested = if index == last { "  " } else { "│ " };
        write_children(dom, child, &format!("{indent}{nested}"), lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleInitError;
    use crate::event::EventKind;
    use crate::rule::{Rule, RuleBox, RuleContext, RuleOptions};
    use crate::types::Severity;

    /// Reports every self-closed element.
    struct SelfClosing;

    impl Rule for SelfClosing {
        fn events(&self) -> &'static [EventKind] {
            &[EventKind::TagEnd]
        }

        fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
            if let Event::TagEnd {
                previous: Some(node),
                ..
            } = event
            {
                let closed = ctx.dom().element(*node).map(|el| el.closed);
                if closed == Some(crate::dom::NodeClosed::VoidSelfClosed) {
                    ctx.report(*node, "self-closed");
                }
            }
        }
    }

    fn self_closing(_: &RuleOptions) -> std::result::Result<RuleBox, RuleInitError> {
        Ok(Box::new(SelfClosing))
    }

    /// Reports every `<b>` once the document is complete.
    struct LateBold;

    impl Rule for LateBold {
        fn events(&self) -> &'static [EventKind] {
            &[EventKind::DomReady]
        }

        fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
            if !matches!(event, Event::DomReady { .. }) {
                return;
            }
            let dom = ctx.dom();
            for node in dom.descendants(dom.root()) {
                if dom.tag_name(node) == "b" {
                    ctx.report(node, "bold");
                }
            }
        }
    }

    fn late_bold(_: &RuleOptions) -> std::result::Result<RuleBox, RuleInitError> {
        Ok(Box::new(LateBold))
    }

    fn rejecting(_: &RuleOptions) -> std::result::Result<RuleBox, RuleInitError> {
        Err(RuleInitError::new("bad options"))
    }

    fn engine(rules: &[(&str, Severity)]) -> Engine {
        let mut config = ResolvedConfig::html5().unwrap();
        for (name, severity) in rules {
            config = config.with_rule(name, *severity, RuleOptions::new());
        }
        let registry = RuleRegistry::new()
            .with("self-closing", self_closing)
            .with("late-bold", late_bold)
            .with("rejecting", rejecting);
        Engine::new(config, registry)
    }

    fn lint(engine: &Engine, markup: &str) -> Vec<(String, String)> {
        let report = engine.lint(&[Source::inline(markup)]).unwrap();
        report
            .results
            .into_iter()
            .flat_map(|r| r.messages)
            .map(|m| (m.rule_id, m.message))
            .collect()
    }

    #[test]
    fn reports_rule_errors() {
        let engine = engine(&[("self-closing", Severity::Error)]);
        let messages = lint(&engine, "<div><i/></div>");
        assert_eq!(messages, vec![("self-closing".to_owned(), "self-closed".to_owned())]);
    }

    #[test]
    fn disabled_rules_write_nothing() {
        let engine = engine(&[("self-closing", Severity::Disabled)]);
        assert!(lint(&engine, "<i/>").is_empty());
    }

    #[test]
    fn missing_rule_is_reported() {
        let engine = engine(&[("nope", Severity::Error)]);
        let messages = lint(&engine, "<p></p>");
        assert_eq!(
            messages,
            vec![("nope".to_owned(), "Definition for rule 'nope' was not found".to_owned())]
        );
    }

    #[test]
    fn rule_init_error_is_fatal() {
        let engine = engine(&[("rejecting", Severity::Error)]);
        let err = engine.lint(&[Source::inline("<p>")]).unwrap_err();
        assert!(matches!(err, EngineError::RuleInit { ref rule, .. } if rule == "rejecting"));
    }

    #[test]
    fn parse_errors_become_diagnostics() {
        let engine = engine(&[]);
        let report = engine
            .lint(&[Source::new("a.html", "<div \"x\">"), Source::new("b.html", "<p>")])
            .unwrap();
        assert!(!report.valid);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].file_path, "a.html");
        assert_eq!(report.results[0].messages[0].rule_id, PARSER_ERROR);
    }

    #[test]
    fn disable_block_suppresses_and_counts_as_used() {
        let engine = engine(&[
            ("self-closing", Severity::Error),
            (NO_UNUSED_DISABLE, Severity::Error),
        ]);
        let markup = "<div><!-- [html-validate-disable-block self-closing] --><i/><i/></div><i/>";
        let messages = lint(&engine, markup);
        assert_eq!(messages, vec![("self-closing".to_owned(), "self-closed".to_owned())]);
    }

    #[test]
    fn empty_block_reports_nothing() {
        let engine = engine(&[
            ("self-closing", Severity::Error),
            (NO_UNUSED_DISABLE, Severity::Error),
        ]);
        let markup = "<div><!-- [html-validate-disable-block self-closing] --></div>";
        assert!(lint(&engine, markup).is_empty());
    }

    #[test]
    fn unused_block_is_reported() {
        let engine = engine(&[
            ("self-closing", Severity::Error),
            (NO_UNUSED_DISABLE, Severity::Error),
        ]);
        let markup = "<div><!-- [html-validate-disable-block self-closing] --><p></p></div>";
        let messages = lint(&engine, markup);
        assert_eq!(
            messages,
            vec![(
                NO_UNUSED_DISABLE.to_owned(),
                "\"self-closing\" rule is disabled but no error was reported".to_owned()
            )]
        );
    }

    fn render(engine: &Engine, markup: &str) -> String {
        let report = engine.lint(&[Source::inline(markup)]).unwrap();
        report
            .results
            .iter()
            .flat_map(|r| r.messages.iter())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn disable_block_covers_reports_after_the_block_ends() {
        let engine = engine(&[
            ("late-bold", Severity::Error),
            (NO_UNUSED_DISABLE, Severity::Error),
        ]);
        let markup = "<div><!-- [html-validate-disable-block late-bold] --><b></b></div><b></b>";
        insta::assert_snapshot!(render(&engine, markup), @"1:68: error [late-bold] bold");
    }

    #[test]
    fn disable_next_covers_reports_after_the_next_element() {
        let engine = engine(&[
            ("late-bold", Severity::Error),
            (NO_UNUSED_DISABLE, Severity::Error),
        ]);
        let markup = "<!-- [html-validate-disable-next late-bold] --><b></b><b></b>";
        insta::assert_snapshot!(render(&engine, markup), @"1:56: error [late-bold] bold");
    }

    #[test]
    fn unused_block_is_reported_at_parse_end() {
        let engine = engine(&[
            ("late-bold", Severity::Error),
            (NO_UNUSED_DISABLE, Severity::Error),
        ]);
        let markup = "<div><!-- [html-validate-disable-block late-bold] --><i></i></div>";
        insta::assert_snapshot!(
            render(&engine, markup),
            @r#"1:40: error [no-unused-disable] "late-bold" rule is disabled but no error was reported"#
        );
    }

    #[test]
    fn disable_next_covers_one_element() {
        let engine = engine(&[("self-closing", Severity::Error)]);
        let markup = "<!-- [html-validate-disable-next self-closing] --><i/><b/>";
        let report = engine.lint(&[Source::inline(markup)]).unwrap();
        let messages = &report.results[0].messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].selector.as_deref(), Some("b"));
    }

    #[test]
    fn disable_and_enable_toggle_following_elements() {
        let engine = engine(&[("self-closing", Severity::Error)]);
        let markup = "<!-- [html-validate-disable self-closing] --><i/>\
                      <!-- [html-validate-enable self-closing] --><b/>";
        let report = engine.lint(&[Source::inline(markup)]).unwrap();
        let selectors: Vec<_> = report.results[0]
            .messages
            .iter()
            .map(|m| m.selector.clone())
            .collect();
        assert_eq!(selectors, vec![Some("b".to_owned())]);
    }

    #[test]
    fn unknown_directive_is_reported() {
        let engine = engine(&[]);
        let messages = lint(&engine, "<!-- [html-validate-frobnicate foo] -->");
        assert_eq!(
            messages,
            vec![(PARSER_ERROR.to_owned(), "Unknown directive \"frobnicate\"".to_owned())]
        );
    }

    #[test]
    fn dump_tree_draws_elements() {
        let engine = engine(&[]);
        let source = Source::inline(
            "<html><head></head><body><p id=\"foo\" class=\"a b\">x</p><ul><li></li></ul></body></html>",
        );
        let lines = engine.dump_tree(&source).unwrap();
        assert_eq!(
            lines,
            vec![
                "(root)",
                "└─┬ html",
                "  ├── head",
                "  └─┬ body",
                "    ├── p#foo.a.b",
                "    └─┬ ul",
                "      └── li",
            ]
        );
    }

    #[test]
    fn dump_tokens_lists_locations() {
        let engine = engine(&[]);
        let tokens = engine.dump_tokens(&Source::inline("<p>")).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(kinds, vec!["TAG_OPEN", "TAG_CLOSE", "EOF"]);
        assert_eq!(tokens[1].location, "inline:1:3");
    }

    #[test]
    fn dump_events_records_parser_events() {
        let engine = engine(&[]);
        let events = engine.dump_events(&Source::inline("<p></p>")).unwrap();
        let names: Vec<_> = events.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "parse:begin",
                "dom:load",
                "tag:start",
                "tag:ready",
                "tag:end",
                "element:ready",
                "dom:ready",
                "parse:end"
            ]
        );
    }
}
