//! Integration test: linting documents through the `HtmlLint` facade.
//!
//! Uses fixture files under `tests/fixtures/`.

use html_lint::{Config, HtmlLint, Report, Severity, Source};
use std::path::PathBuf;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn render(report: &Report) -> String {
    report
        .results
        .iter()
        .flat_map(|r| r.messages.iter())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Recommended preset ──

#[test]
fn valid_document_has_no_messages() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_file(&fixture_root().join("valid.html"))
        .unwrap();

    assert!(report.valid, "unexpected messages:\n{}", render(&report));
    assert!(report.results.is_empty());
    assert_eq!(report.error_count, 0);
}

#[test]
fn invalid_document_reports_each_problem() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_file(&fixture_root().join("invalid.html"))
        .unwrap();

    insta::assert_snapshot!(render(&report), @r#"
    5:2: error [element-permitted-content] <div> element is not permitted as content under <ul>
    7:2: error [deprecated] <center> is deprecated
    9:8: error [no-dup-id] Duplicate ID "x"
    12:2: error [element-required-attributes] <img> is missing required "src" attribute
    "#);
    assert!(!report.valid);
    assert_eq!(report.error_count, 4);
    assert!(report.results[0].file_path.ends_with("invalid.html"));
}

#[test]
fn selectors_point_at_the_offending_element() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_string("<main><ul><div></div></ul></main>")
        .unwrap();
    let message = &report.results[0].messages[0];
    assert_eq!(message.selector.as_deref(), Some("main > ul > div"));
}

// ── Configuration ──

#[test]
fn config_file_overrides_preset() {
    let config = Config::from_file(&fixture_root().join("html-lint.toml")).unwrap();
    let linter = HtmlLint::new(config).unwrap();
    let report = linter
        .validate_file(&fixture_root().join("invalid.html"))
        .unwrap();

    assert_eq!(report.error_count, 3);
    assert!(report
        .results
        .iter()
        .flat_map(|r| &r.messages)
        .all(|m| m.rule_id != "deprecated"));
}

#[test]
fn deprecated_as_warning_keeps_report_valid() {
    let config = Config::parse(
        r#"
[rules]
deprecated = "warn"
"#,
    )
    .unwrap();
    let linter = HtmlLint::new(config).unwrap();
    let report = linter.validate_string("<font>old</font>").unwrap();

    assert!(report.valid);
    assert_eq!(report.warning_count, 1);
    assert_eq!(report.results[0].messages[0].severity, Severity::Warn);
}

#[test]
fn invalid_rule_options_fail_the_run() {
    let config = Config::parse(
        r#"
[rules.attr-case]
style = "camelcase"
"#,
    )
    .unwrap();
    let linter = HtmlLint::new(config).unwrap();
    let err = linter.validate_string("<div></div>").unwrap_err();
    assert!(err.to_string().contains("attr-case"));
}

// ── Directives ──

#[test]
fn unused_disable_is_reported_with_recommended_preset() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_string("<!-- [html-validate-disable-next deprecated] -->\n<div></div>")
        .unwrap();

    insta::assert_snapshot!(render(&report), @r#"1:34: error [no-unused-disable] "deprecated" rule is disabled but no error was reported"#);
}

#[test]
fn disable_block_covers_content_model_errors() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_string(
            "<div><!-- [html-validate-disable-block element-permitted-content] --><ul><div></div></ul></div>",
        )
        .unwrap();

    assert!(report.results.is_empty(), "unexpected messages:\n{}", render(&report));
}

#[test]
fn disable_next_covers_content_model_errors() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_string(
            "<ul><!-- [html-validate-disable-next element-permitted-content] --><div></div></ul>",
        )
        .unwrap();

    assert!(report.results.is_empty(), "unexpected messages:\n{}", render(&report));
}

#[test]
fn disable_block_without_content_model_errors_is_unused() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_string(
            "<div><!-- [html-validate-disable-block element-permitted-content] --><ul><li></li></ul></div>",
        )
        .unwrap();

    insta::assert_snapshot!(render(&report), @r#"1:40: error [no-unused-disable] "element-permitted-content" rule is disabled but no error was reported"#);
}

// ── Multiple sources ──

#[test]
fn sources_are_reported_per_file() {
    let linter = HtmlLint::recommended().unwrap();
    let report = linter
        .validate_sources(&[
            Source::new("a.html", "<center></center>"),
            Source::new("b.html", "<p></p>"),
            Source::new("c.html", "<blink></blink><font></font>"),
        ])
        .unwrap();

    let files: Vec<&str> = report.results.iter().map(|r| r.file_path.as_str()).collect();
    assert_eq!(files, vec!["a.html", "c.html"]);
    assert_eq!(report.error_count, 3);
}

#[test]
fn file_on_disk_is_linted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, "<div>\n<span></div>\n").unwrap();

    let linter = HtmlLint::recommended().unwrap();
    let report = linter.validate_file(&path).unwrap();

    insta::assert_snapshot!(render(&report), @"2:9: error [close-order] Mismatched close-tag, expected '</span>' but found '</div>'.");
}
