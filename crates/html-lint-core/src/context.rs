//! Lexer cursor over a [`Source`].

use crate::types::{Location, Source};

/// Lexer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Start of input, before any doctype.
    Initial,
    /// Inside `<!doctype ...>`.
    Doctype,
    /// Regular character data.
    Text,
    /// Inside a start or end tag.
    Tag,
    /// After an attribute name, expecting an optional value.
    Attr,
    /// Inside `<![CDATA[ ... ]]>`.
    Cdata,
    /// Raw text of a `<script>` element.
    Script,
    /// Raw text of a `<style>` element.
    Style,
}

impl State {
    /// Name used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Doctype => "DOCTYPE",
            Self::Text => "TEXT",
            Self::Tag => "TAG",
            Self::Attr => "ATTR",
            Self::Cdata => "CDATA",
            Self::Script => "SCRIPT",
            Self::Style => "STYLE",
        }
    }
}

/// Content model of the element whose tag is being lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentModel {
    /// Regular markup follows the tag.
    #[default]
    Text,
    /// Raw script text follows the tag.
    Script,
    /// Raw stylesheet text follows the tag.
    Style,
}

/// Cursor tracking position, line and column while consuming input.
#[derive(Debug)]
pub struct Context<'a> {
    source: &'a Source,
    /// Current lexer state.
    pub state: State,
    /// Content model set by the last start tag.
    pub content_model: ContentModel,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Context<'a> {
    /// Creates a cursor at the start of `source`.
    #[must_use]
    pub fn new(source: &'a Source) -> Self {
        Self {
            source,
            state: State::Initial,
            content_model: ContentModel::Text,
            pos: 0,
            line: source.line,
            column: source.column,
        }
    }

    /// Source being consumed.
    #[must_use]
    pub fn source(&self) -> &'a Source {
        self.source
    }

    /// Unconsumed input.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        self.source.data.get(self.pos..).unwrap_or("")
    }

    /// True once all input is consumed.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.data.len()
    }

    /// Byte position within the source data.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Location of the next `size` bytes.
    #[must_use]
    pub fn location(&self, size: usize) -> Location {
        Location::new(
            self.source.filename.clone(),
            self.source.offset + self.pos,
            self.line,
            self.column,
            size,
        )
    }

    /// Consumes `n` bytes and switches to `state`.
    ///
    /// Every newline advances the line and resets the column; other
    /// characters advance the column by one.
    pub fn consume(&mut self, n: usize, state: State) {
        let consumed = self.remaining().get(..n).unwrap_or("");
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += consumed.len();
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_tracks_lines_and_columns() {
        let source = Source::new("test.html", "ab\ncd");
        let mut ctx = Context::new(&source);
        ctx.consume(3, State::Text);
        assert_eq!(ctx.location(1).line, 2);
        assert_eq!(ctx.location(1).column, 1);
        ctx.consume(1, State::Text);
        assert_eq!(ctx.location(1).column, 2);
        assert_eq!(ctx.remaining(), "d");
    }

    #[test]
    fn location_respects_source_offset() {
        let source = Source::new("test.html", "<p>").with_position(4, 10, 120);
        let ctx = Context::new(&source);
        let loc = ctx.location(3);
        assert_eq!((loc.offset, loc.line, loc.column, loc.size), (120, 4, 10, 3));
    }

    #[test]
    fn multibyte_characters_count_as_one_column() {
        let source = Source::new("test.html", "åäö<");
        let mut ctx = Context::new(&source);
        ctx.consume("åäö".len(), State::Text);
        assert_eq!(ctx.location(1).column, 4);
        assert_eq!(ctx.remaining(), "<");
    }
}
