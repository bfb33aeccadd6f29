//! Integration test: configuration, plugins, directives and reporting
//! end-to-end via Engine.
//!
//! Uses fixture files under `tests/fixtures/`.

use html_lint_core::{
    Config, Engine, Event, EventKind, Plugin, Report, Reporter, Rule, RuleBox, RuleContext,
    RuleInitError, RuleOptions, RuleRegistry, Severity, Source,
};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_source(name: &str) -> Source {
    let data = std::fs::read_to_string(fixture_root().join(name)).expect("fixture should exist");
    Source::new(name, data)
}

/// Reports every element after the first `max`.
struct TagCounter {
    max: usize,
    seen: usize,
}

impl Rule for TagCounter {
    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagStart]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        if let Event::TagStart { target, .. } = event {
            self.seen += 1;
            if self.seen > self.max {
                ctx.report(*target, format!("Too many elements (max {})", self.max));
            }
        }
    }
}

fn tag_counter(options: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    let max = usize::try_from(options.get_int("max", 10))
        .map_err(|_| RuleInitError::new("max must be positive"))?;
    Ok(Box::new(TagCounter { max, seen: 0 }))
}

/// Reports every paragraph.
struct NoParagraph;

impl Rule for NoParagraph {
    fn events(&self) -> &'static [EventKind] {
        &[EventKind::TagReady]
    }

    fn handle(&mut self, event: &Event, ctx: &mut RuleContext<'_>) {
        if let Event::TagReady { target, .. } = event {
            if ctx.dom().tag_name(*target) == "p" {
                ctx.report(*target, "paragraph");
            }
        }
    }
}

fn no_paragraph(_: &RuleOptions) -> Result<RuleBox, RuleInitError> {
    Ok(Box::new(NoParagraph))
}

struct TestPlugin;

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        "test-plugin"
    }

    fn rules(&self) -> RuleRegistry {
        let mut rules = RuleRegistry::new().with("plugin-rule", no_paragraph);
        rules.register("undefined-rule", None);
        rules
    }
}

fn fixture_engine() -> Engine {
    let config = Config::from_file(&fixture_root().join("html-lint.toml"))
        .expect("fixture config should parse")
        .resolve(vec![Arc::new(TestPlugin) as Arc<dyn Plugin>])
        .expect("fixture config should resolve");
    Engine::new(config, RuleRegistry::new().with("tag-counter", tag_counter))
}

fn render(report: &Report) -> String {
    report
        .results
        .iter()
        .flat_map(|r| r.messages.iter())
        .map(|m| format!("{m} ({})", m.selector.as_deref().unwrap_or("-")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Directives, plugins and missing rules ──

#[test]
fn fixture_reports_only_unsuppressed_problems() {
    let engine = fixture_engine();
    let report = engine
        .lint(&[fixture_source("directives.html")])
        .expect("lint should succeed");

    insta::assert_snapshot!(render(&report), @r"
    1:1: error [undefined-rule] Definition for rule 'undefined-rule' was not found (-)
    7:2: error [tag-counter] Too many elements (max 2) (section)
    9:4: error [tag-counter] Too many elements (max 2) (section > p)
    ");
    assert!(!report.valid);
    assert_eq!(report.error_count, 3);
    assert_eq!(report.warning_count, 0);
    assert_eq!(
        report.results[0].source.as_deref(),
        Some(fixture_source("directives.html").data.as_str())
    );
}

#[test]
fn unused_directive_is_a_warning() {
    let engine = fixture_engine();
    let source = Source::new(
        "unused.html",
        "<ul>\n<!-- [html-validate-disable-block plugin-rule] -->\n<li></li>\n</ul>",
    );
    let report = engine.lint(&[source]).expect("lint should succeed");

    insta::assert_snapshot!(render(&report), @r#"
    1:1: error [undefined-rule] Definition for rule 'undefined-rule' was not found (-)
    2:35: warn [no-unused-disable] "plugin-rule" rule is disabled but no error was reported (-)
    "#);
    assert_eq!(report.warning_count, 1);
}

#[test]
fn custom_elements_come_from_config() {
    let engine = fixture_engine();
    let widget = engine
        .config()
        .meta_table()
        .get("my-widget")
        .expect("custom element should be known");
    assert!(widget.phrasing);
}

// ── Event stream ──

#[test]
fn event_stream_for_nested_elements() {
    let engine = fixture_engine();
    let events = engine
        .dump_events(&Source::inline(r#"<div id="foo"><p class="bar">baz</p></div>"#))
        .expect("parse should succeed");
    let lines: Vec<String> = events
        .iter()
        .map(|e| match e.data.get("target").and_then(|t| t.as_str()) {
            Some(target) => format!("{}({target})", e.event),
            None => e.event.clone(),
        })
        .collect();

    insta::assert_snapshot!(lines.join("\n"), @r"
    parse:begin
    dom:load
    tag:start(div)
    attr(div)
    tag:ready(div)
    tag:start(p)
    attr(p)
    tag:ready(p)
    tag:end(p)
    element:ready(p)
    tag:end(div)
    element:ready(div)
    dom:ready
    parse:end
    ");
}

#[test]
fn tree_dump_with_implicit_closes() {
    let engine = fixture_engine();
    let lines = engine
        .dump_tree(&Source::inline(
            "<ul id=\"menu\"><li>one<li class=\"active\">two</ul><p>text",
        ))
        .expect("parse should succeed");

    insta::assert_snapshot!(lines.join("\n"), @r"
    (root)
    ├─┬ ul#menu
    │ ├── li
    │ └── li.active
    └── p
    ");
}

// ── Reports ──

#[test]
fn merged_report_counts_do_not_depend_on_order() {
    let engine = fixture_engine();
    let a = engine
        .lint(&[Source::new("same.html", "<p></p>")])
        .expect("lint should succeed");
    let b = engine
        .lint(&[Source::new("same.html", "<div></div>")])
        .expect("lint should succeed");

    let ab = Reporter::merge([a.clone(), b.clone()]);
    let ba = Reporter::merge([b, a]);
    assert_eq!(ab.results.len(), 1);
    assert_eq!(ab.error_count, ba.error_count);
    assert_eq!(ab.warning_count, ba.warning_count);
    assert_eq!(ab.valid, ba.valid);
}

#[test]
fn report_serializes_with_camel_case_keys() {
    let engine = fixture_engine();
    let report = engine
        .lint(&[Source::new("x.html", "<p></p>")])
        .expect("lint should succeed");
    let json = serde_json::to_value(&report).expect("report should serialize");
    assert_eq!(json["errorCount"], 1);
    assert_eq!(json["results"][0]["filePath"], "x.html");
    assert_eq!(json["results"][0]["messages"][0]["ruleId"], "undefined-rule");
    assert_eq!(json["results"][0]["messages"][0]["severity"], "error");
}

#[test]
fn severity_override_from_resolved_config() {
    let config = Config::new()
        .resolve(Vec::new())
        .expect("config should resolve")
        .with_rule("tag-counter", Severity::Warn, RuleOptions::new().with("max", 0));
    let engine = Engine::new(config, RuleRegistry::new().with("tag-counter", tag_counter));
    let report = engine
        .lint(&[Source::inline("<b></b>")])
        .expect("lint should succeed");
    assert!(report.valid);
    assert_eq!(report.warning_count, 1);
}
