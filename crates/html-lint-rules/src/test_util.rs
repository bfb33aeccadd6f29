//! Helpers for running a single bundled rule over markup.

use html_lint_core::{Engine, Message, ResolvedConfig, RuleOptions, Severity, Source};

use crate::bundled_rules;

/// Lints `markup` with only `rule` enabled and returns its messages.
pub(crate) fn lint(rule: &str, options: RuleOptions, markup: &str) -> Vec<Message> {
    let config = ResolvedConfig::html5()
        .expect("bundled metadata should load")
        .with_rule(rule, Severity::Error, options);
    let engine = Engine::new(config, bundled_rules());
    let report = engine
        .lint(&[Source::inline(markup)])
        .expect("markup should parse");
    report
        .results
        .into_iter()
        .flat_map(|result| result.messages)
        .collect()
}

/// Lints with default options and renders each message on its own line.
pub(crate) fn check(rule: &str, markup: &str) -> String {
    render(&lint(rule, RuleOptions::new(), markup))
}

pub(crate) fn render(messages: &[Message]) -> String {
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
