//! # html-lint
//!
//! Event-driven HTML linter with content-model validation.
//!
//! This is the main facade crate that re-exports the core framework and the
//! bundled rules, and provides [`HtmlLint`] as a convenience entry point.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use html_lint::HtmlLint;
//!
//! let linter = HtmlLint::recommended()?;
//! let report = linter.validate_string("<ul><div></div></ul>")?;
//! for result in &report.results {
//!     for message in &result.messages {
//!         println!("{message}");
//!     }
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use html_lint::{Config, HtmlLint};
//!
//! let config = Config::parse(r#"
//! preset = "recommended"
//!
//! [rules]
//! attr-case = "off"
//! "#)?;
//! let linter = HtmlLint::new(config)?;
//! ```
//!
//! ## Directives
//!
//! Rules can be toggled from the markup itself:
//!
//! ```html
//! <!-- [html-validate-disable-next deprecated: legacy banner] -->
//! <center>Welcome</center>
//! ```

#![forbid(unsafe_code)]

pub use html_lint_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use html_lint_rules::*;
}

mod linter;

pub use linter::{HtmlLint, LintError};
