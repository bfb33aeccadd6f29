//! Core value types: severities, source locations and input sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::dom::{AttributeData, HtmlElement};

/// Severity level of a rule and of the messages it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Rule is configured but never writes diagnostics.
    Disabled,
    /// Warning, does not affect report validity.
    Warn,
    /// Error, makes the report invalid.
    #[default]
    Error,
}

impl Severity {
    /// Returns the configuration name of this severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Maps a numeric level (`0`, `1`, `2`) to a severity.
    #[must_use]
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::Disabled),
            1 => Some(Self::Warn),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns true unless the severity is [`Severity::Disabled`].
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "disabled" => Ok(Self::Disabled),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity `{other}`, expected: off, warn, error"
            )),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Name(String),
    Level(i64),
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SeverityRepr::deserialize(deserializer)? {
            SeverityRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            SeverityRepr::Level(level) => Self::from_level(level).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid severity level {level}"))
            }),
        }
    }
}

/// Position of a range of characters within a named input.
///
/// `offset` is a 0-based byte offset, `line` and `column` are 1-based and
/// `size` is the length of the range in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Name of the input this location belongs to.
    pub filename: String,
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Length of the range in bytes.
    pub size: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        offset: usize,
        line: usize,
        column: usize,
        size: usize,
    ) -> Self {
        Self {
            filename: filename.into(),
            offset,
            line,
            column,
            size,
        }
    }

    /// Zero-width location at the very start of `source`.
    #[must_use]
    pub fn start_of(source: &Source) -> Self {
        Self::new(
            source.filename.clone(),
            source.offset,
            source.line,
            source.column,
            0,
        )
    }

    /// Derives a location pointing at a sub-range of this one.
    ///
    /// `begin` and `end` are byte offsets relative to the start of this
    /// location; `end` defaults to the end of this location. When `text`
    /// (the characters covered by this location) is given, newlines before
    /// `begin` move the line and column accordingly.
    #[must_use]
    pub fn slice(&self, begin: usize, end: Option<usize>, text: Option<&str>) -> Self {
        let end = end.unwrap_or(self.size);
        let mut sliced = Self {
            filename: self.filename.clone(),
            offset: self.offset + begin,
            line: self.line,
            column: self.column,
            size: end.saturating_sub(begin),
        };

        match text.and_then(|t| t.get(..begin)) {
            Some(prefix) => {
                for ch in prefix.chars() {
                    if ch == '\n' {
                        sliced.line += 1;
                        sliced.column = 1;
                    } else {
                        sliced.column += 1;
                    }
                }
            }
            None => sliced.column += begin,
        }

        sliced
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// Post-processing callbacks supplied by an external transformer.
///
/// Transformers extracting markup from other formats use these to
/// rewrite attributes (e.g. expanding a templating binding into the
/// attribute it produces) or to patch elements once their start tag has
/// been parsed.
pub trait SourceHooks {
    /// Maps one parsed attribute to the attributes it should become.
    fn process_attribute(&self, attribute: AttributeData) -> Vec<AttributeData> {
        vec![attribute]
    }

    /// Called once for every element after its start tag is parsed.
    fn process_element(&self, _element: &mut HtmlElement) {}
}

/// A unit of input to lint.
///
/// Several sources may share one filename (fragments extracted from the
/// same file); their diagnostics are merged under that filename.
#[derive(Clone)]
pub struct Source {
    /// Name used in locations and reports.
    pub filename: String,
    /// Markup to parse.
    pub data: String,
    /// Line of the first character of `data` within the file.
    pub line: usize,
    /// Column of the first character of `data` within the file.
    pub column: usize,
    /// Byte offset of `data` within the file.
    pub offset: usize,
    /// Untransformed file contents, attached to the report for display.
    pub original_data: Option<String>,
    /// Optional transformer hooks.
    pub hooks: Option<Rc<dyn SourceHooks>>,
}

impl Source {
    /// Creates a source starting at line 1, column 1.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
            line: 1,
            column: 1,
            offset: 0,
            original_data: None,
            hooks: None,
        }
    }

    /// Creates a source named `inline`.
    #[must_use]
    pub fn inline(data: impl Into<String>) -> Self {
        Self::new("inline", data)
    }

    /// Sets where `data` starts within the original file.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize, offset: usize) -> Self {
        self.line = line;
        self.column = column;
        self.offset = offset;
        self
    }

    /// Sets the untransformed file contents.
    #[must_use]
    pub fn with_original_data(mut self, original: impl Into<String>) -> Self {
        self.original_data = Some(original.into());
        self
    }

    /// Attaches transformer hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Rc<dyn SourceHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("filename", &self.filename)
            .field("data", &self.data)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("offset", &self.offset)
            .field("original_data", &self.original_data)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_names_and_levels() {
        assert_eq!("off".parse::<Severity>(), Ok(Severity::Disabled));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
        assert_eq!(Severity::from_level(1), Some(Severity::Warn));
        assert_eq!(Severity::from_level(3), None);
    }

    #[test]
    fn severity_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            a: Severity,
            b: Severity,
        }
        let parsed: Wrapper = toml::from_str("a = \"warn\"\nb = 2").unwrap();
        assert_eq!(parsed.a, Severity::Warn);
        assert_eq!(parsed.b, Severity::Error);
    }

    #[test]
    fn slice_without_text_moves_column() {
        let loc = Location::new("test.html", 10, 2, 5, 8);
        let sliced = loc.slice(1, None, None);
        assert_eq!(sliced.offset, 11);
        assert_eq!(sliced.column, 6);
        assert_eq!(sliced.size, 7);
    }

    #[test]
    fn slice_with_text_follows_newlines() {
        let text = "<p\n  class=\"x\">";
        let loc = Location::new("test.html", 0, 1, 1, text.len());
        let sliced = loc.slice(5, Some(10), Some(text));
        assert_eq!(sliced.line, 2);
        assert_eq!(sliced.column, 3);
        assert_eq!(sliced.size, 5);
    }

    #[test]
    fn location_display() {
        let loc = Location::new("index.html", 0, 3, 7, 1);
        assert_eq!(loc.to_string(), "index.html:3:7");
    }
}
