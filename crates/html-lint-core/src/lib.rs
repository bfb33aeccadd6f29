//! # html-lint-core
//!
//! Core framework for HTML linting.
//!
//! This crate provides the building blocks of the linter:
//!
//! - [`Lexer`] turning markup into located [`Token`]s
//! - [`Parser`] building a [`DomTree`] and emitting [`Event`]s
//! - [`MetaTable`] and [`Validator`] for content-model checks
//! - [`Rule`] trait, [`RuleRegistry`] and [`Plugin`] for pluggable rules
//! - [`Engine`] running rules with directive comments and producing a [`Report`]
//!
//! ## Example
//!
//! ```ignore
//! use html_lint_core::{Config, Engine, Source};
//!
//! let config = Config::parse(r#"[rules]
//! no-self-closing = "error""#)?.resolve(Vec::new())?;
//! let engine = Engine::new(config, my_rules());
//!
//! let report = engine.lint(&[Source::inline("<div/>")])?;
//! assert!(!report.valid);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blocker;
mod config;
mod context;
mod dom;
mod engine;
mod error;
mod event;
mod lexer;
mod parser;
mod reporter;
mod rule;
mod types;

/// Element metadata and content-model validation.
pub mod meta;

pub use blocker::{BlockerSource, NodeAnnotations, RuleBlocker, RuleState};
pub use config::{Config, InvalidRuleConfig, ResolvedConfig, RuleConfig};
pub use context::{ContentModel, Context, State};
pub use dom::{
    Attribute, AttributeData, DomNode, DomTree, HtmlElement, NodeClosed, NodeData, NodeId,
    TextNode, ROOT_TAG,
};
pub use engine::{
    builtin_rules, Engine, EventDump, NoUnusedDisable, TokenDump, NO_UNUSED_DISABLE,
    PARSER_ERROR,
};
pub use error::{
    ConfigError, EngineError, InvalidTokenError, MetaError, ParseError, ParserError, Result,
    RuleInitError,
};
pub use event::{
    AttributeEvent, DirectiveEvent, Event, EventHandler, EventKind, ListenerId, RuleErrorEvent,
};
pub use lexer::{tokenize, Lexer, Matcher, Token, TokenType};
pub use meta::{MetaElement, MetaTable, Validator};
pub use parser::{EventSink, Parser};
pub use reporter::{
    DeferredMessage, FileResult, Message, MessageDiagnostic, Report, Reporter, Selector,
};
pub use rule::{Plugin, Rule, RuleBox, RuleContext, RuleFactory, RuleOptions, RuleRegistry, RuleReport};
pub use types::{Location, Severity, Source, SourceHooks};
