//! Error types for html-lint-core.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::Location;

/// The lexer could not tokenize the input.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
#[error("{location}: {message}")]
#[diagnostic(code(html_lint::lexer))]
pub struct InvalidTokenError {
    /// Where tokenizing stopped.
    pub location: Location,
    /// Human-readable reason.
    pub message: String,
}

/// The token stream did not form a valid document.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
#[error("{location}: {message}")]
#[diagnostic(code(html_lint::parser))]
pub struct ParserError {
    /// Location of the offending token.
    pub location: Location,
    /// Human-readable reason.
    pub message: String,
}

/// Error raised while parsing a source.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseError {
    /// Lexer failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Token(#[from] InvalidTokenError),

    /// Parser failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),
}

impl ParseError {
    /// Location where parsing failed.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::Token(e) => &e.location,
            Self::Parser(e) => &e.location,
        }
    }

    /// Message without the location prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Token(e) => &e.message,
            Self::Parser(e) => &e.message,
        }
    }
}

/// Errors from loading element metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The metadata document could not be parsed.
    #[error("Failed to parse element metadata: {0}")]
    Parse(#[from] toml::de::Error),

    /// A content rule references a category that does not exist.
    #[error("element <{element}> references unknown category `{category}`")]
    UnknownCategory {
        /// Element whose rules reference the category.
        element: String,
        /// The unknown category, including its `@` prefix.
        category: String,
    },

    /// A content rule entry is malformed.
    #[error("element <{element}> has invalid content rule: {message}")]
    InvalidRule {
        /// Element whose rules are malformed.
        element: String,
        /// Description of the problem.
        message: String,
    },
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A rule entry has an invalid shape or severity.
    #[error("Invalid configuration for rule `{rule}`: {message}")]
    InvalidRule {
        /// Rule name.
        rule: String,
        /// Description of the problem.
        message: String,
    },

    /// The configured preset does not exist.
    #[error("Unknown preset `{0}`")]
    UnknownPreset(String),

    /// Element overrides could not be applied.
    #[error(transparent)]
    Meta(#[from] MetaError),
}

/// A rule rejected its options.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RuleInitError {
    /// Description of the problem.
    pub message: String,
}

impl RuleInitError {
    /// Creates a new init error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the engine outside of per-source diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configured rule failed to initialize.
    #[error("Failed to initialize rule `{rule}`: {source}")]
    RuleInit {
        /// Rule name.
        rule: String,
        /// Underlying error.
        source: RuleInitError,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
