//! Token types produced by the lexer.

use serde::Serialize;
use std::fmt;

use crate::types::Location;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// `<!doctype`
    DoctypeOpen,
    /// Doctype value, e.g. `html`.
    DoctypeValue,
    /// `>` ending a doctype.
    DoctypeClose,
    /// `<tag` or `</tag`.
    TagOpen,
    /// `>` or `/>`.
    TagClose,
    /// Attribute name.
    AttrName,
    /// Attribute value including the `=` and quotes.
    AttrValue,
    /// Whitespace or newline.
    Whitespace,
    /// Character data.
    Text,
    /// Raw script text.
    Script,
    /// Raw stylesheet text.
    Style,
    /// Comment, CDATA section or XML declaration.
    Comment,
    /// End of input.
    Eof,
}

impl TokenType {
    /// Name used by token dumps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DoctypeOpen => "DOCTYPE_OPEN",
            Self::DoctypeValue => "DOCTYPE_VALUE",
            Self::DoctypeClose => "DOCTYPE_CLOSE",
            Self::TagOpen => "TAG_OPEN",
            Self::TagClose => "TAG_CLOSE",
            Self::AttrName => "ATTR_NAME",
            Self::AttrValue => "ATTR_VALUE",
            Self::Whitespace => "WHITESPACE",
            Self::Text => "TEXT",
            Self::Script => "SCRIPT",
            Self::Style => "STYLE",
            Self::Comment => "COMMENT",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexed token.
///
/// `data[0]` is the full matched text; the remaining entries are the
/// capture groups of the pattern that produced the token (empty string
/// for a group that did not participate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenType,
    /// Where the token starts and how long it is.
    pub location: Location,
    /// Matched text followed by capture groups.
    pub data: Vec<String>,
}

impl Token {
    /// Full matched text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.group(0)
    }

    /// Capture group `index`, or `""` if absent.
    #[must_use]
    pub fn group(&self, index: usize) -> &str {
        self.data.get(index).map_or("", String::as_str)
    }
}
