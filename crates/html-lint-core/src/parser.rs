//! Builds the document tree from the token stream and emits events.
//!
//! Event order for one source:
//!
//! ```text
//! parse:begin, dom:load, (tag:start, attr*, tag:ready, ..., tag:end, element:ready)*, dom:ready, parse:end
//! ```

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::dom::{Attribute, AttributeData, DomTree, HtmlElement, NodeClosed, NodeId};
use crate::error::{ParseError, ParserError};
use crate::event::{AttributeEvent, DirectiveEvent, Event};
use crate::lexer::{tokenize, Lexer, Token, TokenType};
use crate::meta::MetaTable;
use crate::types::{Location, Source};

#[allow(clippy::expect_used)]
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^<!--\s*\[html-validate-(.*?)\]\s*-->$").expect("Invalid regex")
});

#[allow(clippy::expect_used)]
static DIRECTIVE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([a-zA-Z0-9-]+)\s*(.*?)(?:\s*:\s*(.*))?$").expect("Invalid regex")
});

/// Receives events while a source is parsed.
pub trait EventSink {
    /// Handles one event. `dom` is the tree as built so far.
    fn trigger(&mut self, event: &Event, dom: &DomTree);
}

impl<F: FnMut(&Event, &DomTree)> EventSink for F {
    fn trigger(&mut self, event: &Event, dom: &DomTree) {
        self(event, dom);
    }
}

/// HTML parser producing a [`DomTree`].
pub struct Parser<'m> {
    meta: &'m MetaTable,
    dom: DomTree,
}

impl<'m> Parser<'m> {
    /// Creates a parser using `meta` for element lookups.
    #[must_use]
    pub fn new(meta: &'m MetaTable) -> Self {
        Self {
            meta,
            dom: DomTree::new(Location::default()),
        }
    }

    /// Tree built by the last call to [`Parser::parse_html`].
    #[must_use]
    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// Consumes the parser, returning the tree.
    #[must_use]
    pub fn into_dom(self) -> DomTree {
        self.dom
    }

    /// Parses `source`, sending events to `sink`, and returns the root.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Token`] when the lexer fails and
    /// [`ParseError::Parser`] for structural errors such as an unterminated
    /// tag or a directive without rules.
    pub fn parse_html<S>(&mut self, source: &Source, sink: &mut S) -> Result<NodeId, ParseError>
    where
        S: EventSink + ?Sized,
    {
        debug!("Parsing: {}", source.filename);

        let start = Location::start_of(source);
        self.dom = DomTree::new(start.clone());
        sink.trigger(&Event::ParseBegin { location: start.clone() }, &self.dom);
        sink.trigger(&Event::DomLoad { location: start }, &self.dom);

        let mut lexer = tokenize(source);
        let eof = loop {
            let Some(token) = next_token(&mut lexer)? else {
                return Err(ParserError {
                    location: Location::start_of(source),
                    message: "token stream ended without EOF".to_owned(),
                }
                .into());
            };
            match token.kind {
                TokenType::TagOpen => self.consume_tag(source, token, &mut lexer, sink)?,
                TokenType::Whitespace => {
                    sink.trigger(
                        &Event::Whitespace {
                            text: token.text().to_owned(),
                            location: token.location.clone(),
                        },
                        &self.dom,
                    );
                    self.append_text(&token);
                }
                TokenType::DoctypeOpen => self.consume_doctype(token, &mut lexer, sink)?,
                TokenType::Comment => self.consume_comment(&token, sink)?,
                TokenType::Text | TokenType::Script | TokenType::Style => self.append_text(&token),
                TokenType::Eof => break token.location,
                kind => {
                    return Err(ParserError {
                        location: token.location,
                        message: format!("unexpected {kind} token"),
                    }
                    .into())
                }
            }
        };

        self.close_tree(&eof, sink);
        sink.trigger(&Event::DomReady { location: eof.clone() }, &self.dom);
        sink.trigger(&Event::ParseEnd { location: eof }, &self.dom);

        Ok(self.dom.root())
    }

    fn append_text(&mut self, token: &Token) {
        let active = self.dom.active();
        self.dom
            .append_text(active, token.text(), token.location.clone());
    }

    fn consume_tag<S>(
        &mut self,
        source: &Source,
        start: Token,
        lexer: &mut Lexer<'_>,
        sink: &mut S,
    ) -> Result<(), ParseError>
    where
        S: EventSink + ?Sized,
    {
        let mut tokens = Vec::new();
        let end = loop {
            match next_token(lexer)? {
                Some(token) if token.kind == TokenType::TagClose => break token,
                Some(token) if token.kind != TokenType::Eof => tokens.push(token),
                _ => {
                    return Err(ParserError {
                        location: start.location.clone(),
                        message: "stream ended before TAG_CLOSE token was found".to_owned(),
                    }
                    .into())
                }
            }
        };

        let closing = start.group(1) == "/";
        let name = start.group(2).to_owned();
        let begin = if closing { 2 } else { 1 };
        let location = start
            .location
            .slice(begin, Some(begin + name.len()), None);

        if closing {
            self.close_by_end_tag(&name, location, sink);
            return Ok(());
        }

        let meta = self.meta.get(&name);
        let mut element = HtmlElement::new(&name, location.clone(), meta);
        if end.text() == "/>" {
            element.closed = NodeClosed::VoidSelfClosed;
        } else if element.is_void() {
            element.closed = NodeClosed::VoidOmitted;
        }
        let node = self.dom.create_detached(element);

        let active = self.dom.active();
        let implicitly_closed = active != NodeId::ROOT
            && self
                .dom
                .element(active)
                .and_then(|el| el.meta.as_ref())
                .is_some_and(|meta| meta.is_implicitly_closed_by(&name));
        if implicitly_closed {
            debug!("<{}> implicitly closed by <{}>", self.dom.tag_name(active), name);
            self.close_element(active, Some(node), NodeClosed::Implicit, &location, sink);
            self.dom.pop_active();
        }

        let parent = self.dom.active();
        self.dom.attach(parent, node);
        self.dom.push_active(node);
        sink.trigger(
            &Event::TagStart {
                target: node,
                location: location.clone(),
            },
            &self.dom,
        );

        let mut i = 0;
        while i < tokens.len() {
            if tokens[i].kind == TokenType::AttrName {
                let value = tokens
                    .get(i + 1)
                    .filter(|t| t.kind == TokenType::AttrValue);
                self.consume_attribute(source, node, &tokens[i], value, sink);
                i += if value.is_some() { 2 } else { 1 };
            } else {
                i += 1;
            }
        }

        if let (Some(hooks), Some(element)) = (&source.hooks, self.dom.element_mut(node)) {
            hooks.process_element(element);
        }

        sink.trigger(
            &Event::TagReady {
                target: node,
                location: end.location.clone(),
            },
            &self.dom,
        );

        let closed = self
            .dom
            .element(node)
            .map_or(NodeClosed::Open, |el| el.closed);
        if closed != NodeClosed::Open {
            self.close_element(node, Some(node), closed, &end.location, sink);
            self.dom.pop_active();
        }

        Ok(())
    }

    fn close_by_end_tag<S>(&mut self, name: &str, location: Location, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        let meta = self.meta.get(name);
        let end_node = self
            .dom
            .create_detached(HtmlElement::new(name, location.clone(), meta));

        let Some(matched) = self.dom.find_open(name) else {
            debug!("Stray end tag </{}>", name);
            sink.trigger(
                &Event::TagEnd {
                    target: Some(end_node),
                    previous: None,
                    location,
                },
                &self.dom,
            );
            return;
        };

        loop {
            let active = self.dom.active();
            if active == matched {
                break;
            }
            self.close_element(active, Some(end_node), NodeClosed::Implicit, &location, sink);
            self.dom.pop_active();
        }

        self.close_element(matched, Some(end_node), NodeClosed::EndTag, &location, sink);
        self.dom.pop_active();
    }

    fn close_element<S>(
        &mut self,
        node: NodeId,
        target: Option<NodeId>,
        closed: NodeClosed,
        location: &Location,
        sink: &mut S,
    ) where
        S: EventSink + ?Sized,
    {
        let element_location = match self.dom.element_mut(node) {
            Some(element) => {
                if element.closed == NodeClosed::Open {
                    element.closed = closed;
                }
                element.location.clone()
            }
            None => location.clone(),
        };

        sink.trigger(
            &Event::TagEnd {
                target,
                previous: Some(node),
                location: location.clone(),
            },
            &self.dom,
        );
        sink.trigger(
            &Event::ElementReady {
                target: node,
                location: element_location,
            },
            &self.dom,
        );
    }

    /// Closes every element still open at end of input.
    fn close_tree<S>(&mut self, location: &Location, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        loop {
            let active = self.dom.active();
            if active == NodeId::ROOT {
                break;
            }
            self.close_element(active, None, NodeClosed::Open, location, sink);
            self.dom.pop_active();
        }
    }

    fn consume_attribute<S>(
        &mut self,
        source: &Source,
        node: NodeId,
        key: &Token,
        value: Option<&Token>,
        sink: &mut S,
    ) where
        S: EventSink + ?Sized,
    {
        let (value_text, quote, value_location) = match value {
            Some(token) => {
                let quote = token.group(3).chars().next();
                let begin = token.group(1).len() + quote.map_or(0, char::len_utf8);
                let text = token.group(2);
                let location = token
                    .location
                    .slice(begin, Some(begin + text.len()), Some(token.text()));
                (Some(text.to_owned()), quote, Some(location))
            }
            None => (None, None, None),
        };

        let data = AttributeData {
            key: key.group(1).to_owned(),
            value: value_text,
            quote,
            original_attribute: None,
        };
        let processed = match &source.hooks {
            Some(hooks) => hooks.process_attribute(data),
            None => vec![data],
        };

        for attr in processed {
            let attribute = Attribute {
                key: attr.key,
                value: attr.value,
                quote: attr.quote,
                key_location: key.location.clone(),
                value_location: value_location.clone(),
                original_attribute: attr.original_attribute,
            };
            let event = Event::Attr(AttributeEvent {
                target: node,
                key: attribute.key.clone(),
                value: attribute.value.clone(),
                quote: attribute.quote,
                original_attribute: attribute.original_attribute.clone(),
                location: attribute.key_location.clone(),
                value_location: attribute.value_location.clone(),
            });
            if let Some(element) = self.dom.element_mut(node) {
                element.attributes.push(attribute);
            }
            sink.trigger(&event, &self.dom);
        }
    }

    fn consume_doctype<S>(
        &mut self,
        open: Token,
        lexer: &mut Lexer<'_>,
        sink: &mut S,
    ) -> Result<(), ParseError>
    where
        S: EventSink + ?Sized,
    {
        let mut value: Option<Token> = None;
        loop {
            match next_token(lexer)? {
                Some(token) if token.kind == TokenType::DoctypeClose => break,
                Some(token) if token.kind == TokenType::DoctypeValue => value = Some(token),
                Some(token) if token.kind == TokenType::Whitespace => {}
                _ => {
                    return Err(ParserError {
                        location: open.location,
                        message: "stream ended before DOCTYPE_CLOSE token was found".to_owned(),
                    }
                    .into())
                }
            }
        }

        let (value, value_location) = match value {
            Some(token) => {
                let trimmed = token.text().trim_end();
                let location = token.location.slice(0, Some(trimmed.len()), None);
                (trimmed.to_owned(), location)
            }
            None => (String::new(), open.location.slice(open.location.size, None, None)),
        };

        sink.trigger(
            &Event::Doctype {
                tag: open.group(1).to_owned(),
                value,
                value_location,
                location: open.location,
            },
            &self.dom,
        );
        Ok(())
    }

    fn consume_comment<S>(&mut self, token: &Token, sink: &mut S) -> Result<(), ParseError>
    where
        S: EventSink + ?Sized,
    {
        let text = token.text();
        let Some(body) = DIRECTIVE.captures(text).and_then(|caps| caps.get(1)) else {
            return Ok(());
        };
        let base = body.start();

        let Some(parts) = DIRECTIVE_BODY.captures(body.as_str()) else {
            return Err(ParserError {
                location: token.location.clone(),
                message: format!("Failed to parse directive \"{}\"", body.as_str()),
            }
            .into());
        };

        let slice = |m: regex::Match<'_>| {
            token
                .location
                .slice(base + m.start(), Some(base + m.end()), Some(text))
        };
        let (Some(action), Some(data)) = (parts.get(1), parts.get(2)) else {
            return Ok(());
        };

        if data.as_str().trim().is_empty() {
            return Err(ParserError {
                location: token.location.clone(),
                message: format!("Missing rules after \"{}\" directive", action.as_str()),
            }
            .into());
        }

        let comment = parts.get(3);
        let directive = DirectiveEvent {
            action: action.as_str().to_owned(),
            data: data.as_str().to_owned(),
            comment: comment.map_or_else(String::new, |m| m.as_str().to_owned()),
            location: token.location.clone(),
            action_location: slice(action),
            options_location: slice(data),
            comment_location: comment.map(slice),
        };
        sink.trigger(&Event::Directive(directive), &self.dom);
        Ok(())
    }
}

fn next_token(lexer: &mut Lexer<'_>) -> Result<Option<Token>, ParseError> {
    Ok(lexer.next().transpose()?)
}
