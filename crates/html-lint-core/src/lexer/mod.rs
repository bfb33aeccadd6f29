//! State-machine tokenizer.
//!
//! Each [`State`] owns an ordered list of rules. The first rule whose
//! matcher accepts the remaining input wins: it may emit a token, consumes
//! the matched text and moves the lexer to the next state. A
//! [`Matcher::Fallback`] rule consumes nothing and only switches state; it
//! is always the last rule of its list.
//!
//! Every consumed byte belongs to exactly one token, so concatenating the
//! matched text of all tokens reproduces the input.

mod token;

pub use token::{Token, TokenType};

use regex::Regex;
use std::sync::LazyLock;

use crate::context::{ContentModel, Context, State};
use crate::error::InvalidTokenError;
use crate::types::Source;

/// How a rule recognizes input.
pub enum Matcher {
    /// Anchored regular expression; capture groups become token data.
    Pattern(Regex),
    /// Hand-written scanner returning the number of bytes to consume.
    Scan(fn(&str) -> Option<usize>),
    /// Always matches, consumes nothing.
    Fallback,
}

impl Matcher {
    fn apply(&self, input: &str) -> Option<Vec<String>> {
        match self {
            Self::Pattern(re) => re.captures(input).map(|caps| {
                caps.iter()
                    .map(|m| m.map_or_else(String::new, |m| m.as_str().to_owned()))
                    .collect()
            }),
            Self::Scan(scan) => scan(input)
                .and_then(|n| input.get(..n))
                .map(|matched| vec![matched.to_owned()]),
            Self::Fallback => Some(vec![String::new()]),
        }
    }
}

#[derive(Clone, Copy)]
enum Next {
    State(State),
    /// Leaves a tag: raw text for `<script>`/`<style>`, otherwise text.
    AfterTagClose,
}

struct LexRule {
    matcher: Matcher,
    next: Next,
    kind: Option<TokenType>,
}

impl LexRule {
    fn new(matcher: Matcher, next: State, kind: Option<TokenType>) -> Self {
        Self {
            matcher,
            next: Next::State(next),
            kind,
        }
    }
}

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Matcher {
    Matcher::Pattern(Regex::new(re).expect("Invalid regex"))
}

const WHITESPACE: &str = r"^(?:\r\n|\r|\n|[ \t\f]+(?:\r\n|\r|\n)?)";

struct Rules {
    initial: Vec<LexRule>,
    doctype: Vec<LexRule>,
    text: Vec<LexRule>,
    tag: Vec<LexRule>,
    attr: Vec<LexRule>,
    cdata: Vec<LexRule>,
    script: Vec<LexRule>,
    style: Vec<LexRule>,
}

impl Rules {
    fn for_state(&self, state: State) -> &[LexRule] {
        match state {
            State::Initial => &self.initial,
            State::Doctype => &self.doctype,
            State::Text => &self.text,
            State::Tag => &self.tag,
            State::Attr => &self.attr,
            State::Cdata => &self.cdata,
            State::Script => &self.script,
            State::Style => &self.style,
        }
    }
}

static RULES: LazyLock<Rules> = LazyLock::new(|| {
    use TokenType as T;
    Rules {
        initial: vec![
            LexRule::new(pattern(r"(?s)^<\?xml.*?\?>"), State::Initial, Some(T::Comment)),
            LexRule::new(pattern(WHITESPACE), State::Initial, Some(T::Whitespace)),
            LexRule::new(pattern(r"(?i)^<!(doctype)\s"), State::Doctype, Some(T::DoctypeOpen)),
            LexRule::new(Matcher::Fallback, State::Text, None),
        ],
        doctype: vec![
            LexRule::new(pattern(WHITESPACE), State::Doctype, Some(T::Whitespace)),
            LexRule::new(pattern(r"^[^>]+"), State::Doctype, Some(T::DoctypeValue)),
            LexRule::new(pattern(r"^>"), State::Text, Some(T::DoctypeClose)),
        ],
        text: vec![
            LexRule::new(pattern(WHITESPACE), State::Text, Some(T::Whitespace)),
            LexRule::new(pattern(r"^<!\[CDATA\["), State::Cdata, Some(T::Comment)),
            LexRule::new(pattern(r"(?s)^<!--(.*?)-->"), State::Text, Some(T::Comment)),
            LexRule::new(pattern(r"^<(/?)([a-zA-Z0-9\-:]+)"), State::Tag, Some(T::TagOpen)),
            LexRule::new(Matcher::Scan(scan_text), State::Text, Some(T::Text)),
        ],
        tag: vec![
            LexRule {
                matcher: pattern(r"^/?>"),
                next: Next::AfterTagClose,
                kind: Some(T::TagClose),
            },
            LexRule::new(pattern(r#"^([^\t\r\n\f /><"'=]+)"#), State::Attr, Some(T::AttrName)),
            LexRule::new(pattern(WHITESPACE), State::Tag, Some(T::Whitespace)),
        ],
        attr: vec![
            LexRule::new(pattern(r"^(\s*=\s*)'([^']*?)(')"), State::Tag, Some(T::AttrValue)),
            LexRule::new(pattern(r#"^(\s*=\s*)"([^"]*?)(")"#), State::Tag, Some(T::AttrValue)),
            LexRule::new(
                pattern(r#"^(\s*=\s*)([^\t\r\n\f "'<>][^\t\r\n\f <>]*)"#),
                State::Tag,
                Some(T::AttrValue),
            ),
            LexRule::new(Matcher::Fallback, State::Tag, None),
        ],
        cdata: vec![LexRule::new(Matcher::Scan(scan_cdata), State::Text, Some(T::Comment))],
        script: vec![
            LexRule::new(pattern(r"(?i)^<(/)(script)"), State::Tag, Some(T::TagOpen)),
            LexRule::new(Matcher::Scan(|s| scan_raw_text(s, "</script")), State::Script, Some(T::Script)),
        ],
        style: vec![
            LexRule::new(pattern(r"(?i)^<(/)(style)"), State::Tag, Some(T::TagOpen)),
            LexRule::new(Matcher::Scan(|s| scan_raw_text(s, "</style")), State::Style, Some(T::Style)),
        ],
    }
});

/// True when character data must stop before `rest`: a newline, a run of
/// blanks ending in a newline, or `<` followed by something other than a
/// space.
fn text_stops_at(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    match bytes.first() {
        Some(b'<') => bytes.get(1).is_some_and(|b| *b != b' '),
        Some(b'\r' | b'\n') => true,
        Some(b' ' | b'\t' | b'\x0c') => {
            let blanks = bytes
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\x0c'))
                .count();
            matches!(bytes.get(blanks), Some(b'\r' | b'\n'))
        }
        _ => false,
    }
}

fn scan_text(input: &str) -> Option<usize> {
    let end = input
        .char_indices()
        .skip(1)
        .find(|(i, _)| text_stops_at(&input[*i..]))
        .map_or(input.len(), |(i, _)| i);
    (end > 0).then_some(end)
}

fn scan_raw_text(input: &str, terminator: &str) -> Option<usize> {
    let lower = input.to_ascii_lowercase();
    let end = lower.find(terminator).unwrap_or(input.len());
    (end > 0).then_some(end)
}

fn scan_cdata(input: &str) -> Option<usize> {
    let end = input.find("]]>").map_or(input.len(), |i| i + 3);
    (end > 0).then_some(end)
}

fn truncate(input: &str) -> String {
    const MAX: usize = 15;
    match input.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &input[..i]),
        None => input.to_owned(),
    }
}

fn expected(state: State) -> &'static str {
    match state {
        State::Tag => "expected attribute, \">\" or \"/>\"",
        State::Doctype => "expected doctype value or \">\"",
        _ => "no rule matched",
    }
}

/// Lazy token stream over a [`Source`].
///
/// Yields tokens until exactly one [`TokenType::Eof`] or one error has
/// been produced, then only `None`.
pub struct Lexer<'a> {
    context: Context<'a>,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &'a Source) -> Self {
        Self {
            context: Context::new(source),
            done: false,
        }
    }

    fn step(&mut self) -> Result<Option<Token>, InvalidTokenError> {
        let state = self.context.state;
        let remaining = self.context.remaining();

        for rule in RULES.for_state(state) {
            let Some(data) = rule.matcher.apply(remaining) else {
                continue;
            };
            let len = data.first().map_or(0, String::len);
            let next = match rule.next {
                Next::State(next) => next,
                Next::AfterTagClose => self.after_tag_close(&data),
            };

            if len == 0 && next == state {
                return Err(self.error(format!(
                    "failed to tokenize {:?}, state {} failed to consume data or change state.",
                    truncate(remaining),
                    state.as_str()
                )));
            }

            let location = self.context.location(len);
            self.context.consume(len, next);
            self.enter(next, &data);

            return Ok(rule.kind.map(|kind| Token {
                kind,
                location,
                data,
            }));
        }

        Err(self.error(format!(
            "failed to tokenize {:?}, {}.",
            truncate(remaining),
            expected(state)
        )))
    }

    fn after_tag_close(&self, data: &[String]) -> State {
        let self_closed = data.first().is_some_and(|d| d.starts_with('/'));
        match self.context.content_model {
            ContentModel::Script if !self_closed => State::Script,
            ContentModel::Style if !self_closed => State::Style,
            _ => State::Text,
        }
    }

    fn enter(&mut self, state: State, data: &[String]) {
        if state != State::Tag {
            return;
        }
        let Some(full) = data.first() else { return };
        if !full.starts_with('<') {
            return;
        }
        let closing = data.get(1).is_some_and(|slash| slash == "/");
        let name = data.get(2).map(|n| n.to_ascii_lowercase());
        self.context.content_model = match name.as_deref() {
            Some("script") if !closing => ContentModel::Script,
            Some("style") if !closing => ContentModel::Style,
            _ => ContentModel::Text,
        };
    }

    fn error(&self, message: String) -> InvalidTokenError {
        InvalidTokenError {
            location: self.context.location(1),
            message,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, InvalidTokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.context.is_eof() {
                self.done = true;
                return Some(Ok(Token {
                    kind: TokenType::Eof,
                    location: self.context.location(0),
                    data: vec![String::new()],
                }));
            }
            match self.step() {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Tokenizes `source`.
#[must_use]
pub fn tokenize(source: &Source) -> Lexer<'_> {
    Lexer::new(source)
}
