//! Output formatting for lint reports.

use anyhow::Result;
use html_lint::{MessageDiagnostic, Report, Severity};
use miette::NamedSource;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat, files_checked: usize) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report, files_checked),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &Report, files_checked: usize) {
    for result in &report.results {
        let source = result.source.clone().unwrap_or_default();
        for message in &result.messages {
            let severity_indicator = match message.severity {
                Severity::Error => "\x1b[31merror\x1b[0m",
                Severity::Warn => "\x1b[33mwarning\x1b[0m",
                Severity::Disabled => continue,
            };
            println!(
                "{}:{}:{}: {}",
                result.file_path, message.line, message.column, severity_indicator
            );
            let diagnostic = miette::Report::new(MessageDiagnostic::from(message))
                .with_source_code(NamedSource::new(&result.file_path, source.clone()));
            println!("{diagnostic:?}");
        }
    }

    let summary_color = if report.error_count > 0 {
        "\x1b[31m"
    } else if report.warning_count > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s) in {} file(s)\x1b[0m",
        summary_color, report.error_count, report.warning_count, files_checked
    );
}

fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &Report) {
    for result in &report.results {
        for message in &result.messages {
            println!("{}:{message}", result.file_path);
        }
    }
}
