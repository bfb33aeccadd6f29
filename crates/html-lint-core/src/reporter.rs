//! Collects diagnostics per file and produces the final [`Report`].

use indexmap::IndexMap;
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::dom::{DomTree, NodeId};
use crate::types::{Location, Severity, Source};

/// Selector of the element a message is about, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Not computed yet.
    Pending(NodeId),
    /// Computed (or no element).
    Resolved(Option<String>),
}

/// A recorded diagnostic whose selector may still be pending.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredMessage {
    /// Reporting rule.
    pub rule_id: String,
    /// Documentation URL of the rule.
    pub rule_url: Option<String>,
    /// Severity at the time of reporting.
    pub severity: Severity,
    /// Message text.
    pub message: String,
    /// Location of the problem.
    pub location: Location,
    /// Element selector.
    pub selector: Selector,
    /// Extra data for formatters.
    pub context: Option<Value>,
}

impl DeferredMessage {
    /// Creates a message without selector or context.
    #[must_use]
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_url: None,
            severity,
            message: message.into(),
            location,
            selector: Selector::Resolved(None),
            context: None,
        }
    }

    /// Attaches the element the message is about.
    #[must_use]
    pub fn with_node(mut self, node: Option<NodeId>) -> Self {
        self.selector = node.map_or(Selector::Resolved(None), Selector::Pending);
        self
    }

    /// Attaches a documentation URL.
    #[must_use]
    pub fn with_url(mut self, url: Option<&str>) -> Self {
        self.rule_url = url.map(str::to_owned);
        self
    }

    /// Attaches formatter context.
    #[must_use]
    pub fn with_context(mut self, context: Option<Value>) -> Self {
        self.context = context;
        self
    }

    fn into_message(self) -> Message {
        let selector = match self.selector {
            Selector::Resolved(selector) => selector,
            Selector::Pending(_) => None,
        };
        Message {
            rule_id: self.rule_id,
            rule_url: self.rule_url,
            severity: self.severity,
            message: self.message,
            offset: self.location.offset,
            line: self.location.line,
            column: self.location.column,
            size: self.location.size,
            selector,
            context: self.context,
        }
    }
}

/// A finalized diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Reporting rule.
    pub rule_id: String,
    /// Documentation URL of the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_url: Option<String>,
    /// Severity.
    pub severity: Severity,
    /// Message text.
    pub message: String,
    /// Byte offset.
    pub offset: usize,
    /// Line (1-indexed).
    pub line: usize,
    /// Column (1-indexed).
    pub column: usize,
    /// Length in bytes.
    pub size: usize,
    /// CSS-like selector of the element.
    pub selector: Option<String>,
    /// Extra data for formatters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.line, self.column, self.severity, self.rule_id, self.message
        )
    }
}

/// Diagnostics of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Filename as given in the source.
    pub file_path: String,
    /// Messages sorted by line, then column.
    pub messages: Vec<Message>,
    /// Number of error messages.
    pub error_count: usize,
    /// Number of warning messages.
    pub warning_count: usize,
    /// Original file contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result of a lint run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// True when there are no errors.
    pub valid: bool,
    /// Per-file results.
    pub results: Vec<FileResult>,
    /// Total errors.
    pub error_count: usize,
    /// Total warnings.
    pub warning_count: usize,
}

impl Report {
    /// Builds a report from results, computing counts and validity.
    #[must_use]
    pub fn from_results(results: Vec<FileResult>) -> Self {
        let error_count = results.iter().map(|r| r.error_count).sum();
        let warning_count = results.iter().map(|r| r.warning_count).sum();
        Self {
            valid: error_count == 0,
            results,
            error_count,
            warning_count,
        }
    }
}

fn count(messages: &[Message], severity: Severity) -> usize {
    messages.iter().filter(|m| m.severity == severity).count()
}

/// Accumulates messages per filename.
#[derive(Debug, Default)]
pub struct Reporter {
    results: IndexMap<String, Vec<DeferredMessage>>,
}

impl Reporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for the file named in its location.
    pub fn add(&mut self, message: DeferredMessage) {
        self.results
            .entry(message.location.filename.clone())
            .or_default()
            .push(message);
    }

    /// Records a message for an explicit filename.
    pub fn add_manual(&mut self, filename: &str, message: DeferredMessage) {
        self.results
            .entry(filename.to_owned())
            .or_default()
            .push(message);
    }

    /// Number of messages recorded for `filename`.
    #[must_use]
    pub fn message_count(&self, filename: &str) -> usize {
        self.results.get(filename).map_or(0, Vec::len)
    }

    /// Resolves pending selectors of `filename` against `dom`.
    ///
    /// Called right after a source is parsed, while its tree is still
    /// available. Only recorded messages are resolved.
    pub fn freeze(&mut self, filename: &str, dom: &DomTree) {
        let Some(messages) = self.results.get_mut(filename) else {
            return;
        };
        for message in messages {
            if let Selector::Pending(node) = message.selector {
                message.selector = Selector::Resolved(dom.generate_selector(node));
            }
        }
    }

    /// Finalizes all results.
    ///
    /// Messages are sorted by line and column (stable); each result carries
    /// the original (or raw) data of the first source with its filename.
    #[must_use]
    pub fn save(self, sources: &[Source]) -> Report {
        let results = self
            .results
            .into_iter()
            .map(|(file_path, deferred)| {
                let mut messages: Vec<Message> =
                    deferred.into_iter().map(DeferredMessage::into_message).collect();
                messages.sort_by_key(|m| (m.line, m.column));
                let source = sources
                    .iter()
                    .find(|s| s.filename == file_path)
                    .map(|s| s.original_data.clone().unwrap_or_else(|| s.data.clone()));
                FileResult {
                    error_count: count(&messages, Severity::Error),
                    warning_count: count(&messages, Severity::Warn),
                    file_path,
                    messages,
                    source,
                }
            })
            .collect();
        Report::from_results(results)
    }

    /// Merges reports, concatenating messages of the same file in the
    /// order the reports are given, then sorting them by line and column.
    ///
    /// The sort is stable: messages at the same position keep the order of
    /// the reports.
    #[must_use]
    pub fn merge(reports: impl IntoIterator<Item = Report>) -> Report {
        let mut merged: IndexMap<String, FileResult> = IndexMap::new();
        for report in reports {
            for result in report.results {
                match merged.get_mut(&result.file_path) {
                    Some(existing) => {
                        existing.messages.extend(result.messages);
                        if existing.source.is_none() {
                            existing.source = result.source;
                        }
                    }
                    None => {
                        merged.insert(result.file_path.clone(), result);
                    }
                }
            }
        }

        let results = merged
            .into_values()
            .map(|mut result| {
                result.messages.sort_by_key(|m| (m.line, m.column));
                result.error_count = count(&result.messages, Severity::Error);
                result.warning_count = count(&result.messages, Severity::Warn);
                result
            })
            .collect();
        Report::from_results(results)
    }
}

/// Renders a [`Message`] as a miette diagnostic.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct MessageDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Message> for MessageDiagnostic {
    fn from(m: &Message) -> Self {
        Self {
            message: format!("[{}] {}", m.rule_id, m.message),
            help: m.rule_url.clone(),
            span: SourceSpan::from((m.offset, m.size)),
            label_message: m.selector.clone().unwrap_or_else(|| m.rule_id.clone()),
        }
    }
}
