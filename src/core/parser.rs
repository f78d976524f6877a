//! Recursive-descent parse engine
//!
//! Turns one complete buffer into a [`Document`]. Entity references in text
//! and attribute values are decoded inside the buffer as it is scanned, and
//! every name and value becomes a span into it; the buffer then moves into
//! the document unchanged in size.
//!
//! Grammar accepted at each `<`:
//!
//! - `<?xml ` declaration with attribute-style parameters, closed by `?>`
//! - `<?target ...?>` processing instruction
//! - `<!-- ... -->` comment; `--` inside the body is rejected
//! - `<![CDATA[ ... ]]>` section ending at the first `]]`
//! - `<!DOCTYPE ...>` with a bracketed internal subset
//! - element with attributes, `>` content or `/>`

use tracing::debug;

use super::encoding::{prepare, Prepared};
use super::scanner::Scanner;
use super::tables::{attribute_classes, is, CharClass};
use crate::dom::arena::ArenaPolicy;
use crate::dom::{Document, NodeId, NodeKind, Span};
use crate::error::{Error, ErrorContext, Found, Result, SyntaxError};

/// Parser settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Compare closing tag names against their opening tags
    pub validate_closing_tags: bool,
    /// Deepest element nesting accepted
    pub max_depth: usize,
    /// Slab growth for the node and attribute arenas
    pub arena: ArenaPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            validate_closing_tags: true,
            max_depth: 1024,
            arena: ArenaPolicy::default(),
        }
    }
}

impl ParseOptions {
    pub fn validate_closing_tags(mut self, validate: bool) -> Self {
        self.validate_closing_tags = validate;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn arena(mut self, arena: ArenaPolicy) -> Self {
        self.arena = arena;
        self
    }
}

/// Parse a complete buffer
pub fn parse_document(input: Vec<u8>, options: &ParseOptions) -> Result<Document> {
    let Prepared {
        mut buffer,
        start,
        encoding,
    } = prepare(input)?;

    if buffer.len() > u32::MAX as usize {
        return Err(Error::TooLarge { len: buffer.len() });
    }
    debug!(len = buffer.len(), ?encoding, "parse started");

    let mut doc = Document::with_policy(options.arena);
    let result = Parser {
        scanner: Scanner::new(&mut buffer, start),
        doc: &mut doc,
        options: *options,
        depth: 0,
    }
    .parse();

    if let Err(err) = result {
        debug!(position = ?err.position(), error = %err, "parse failed");
        return Err(err);
    }

    doc.set_buffer(buffer, encoding);
    let (node_slabs, attribute_slabs) = doc.slab_counts();
    debug!(
        nodes = doc.node_count(),
        attributes = doc.attribute_count(),
        node_slabs,
        attribute_slabs,
        "parse finished"
    );
    Ok(doc)
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    doc: &'a mut Document,
    options: ParseOptions,
    /// Elements currently open
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> Result<()> {
        let root = self.doc.root();
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None => return Ok(()),
                Some(b'<') => {
                    self.scanner.advance(1);
                    let node = self.parse_node()?;
                    self.doc.append_child(root, node);
                }
                found => {
                    return self.fail(SyntaxError::ExpectedByte {
                        expected: "'<'",
                        found: Found(found),
                    })
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    fn error_at(&self, kind: SyntaxError, position: usize) -> Error {
        Error::Syntax {
            kind,
            position,
            context: ErrorContext::capture(self.scanner.input(), position),
        }
    }

    fn fail<T>(&self, kind: SyntaxError) -> Result<T> {
        Err(self.error_at(kind, self.scanner.position()))
    }

    fn eof(&self, construct: &'static str) -> Error {
        self.error_at(SyntaxError::UnexpectedEof { construct }, self.scanner.position())
    }

    /// Consume `byte` or fail naming `expected`
    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<()> {
        match self.scanner.peek() {
            Some(b) if b == byte => {
                self.scanner.advance(1);
                Ok(())
            }
            found => self.fail(SyntaxError::ExpectedByte {
                expected,
                found: Found(found),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    #[inline]
    fn span(start: usize, end: usize) -> Span {
        Span::new(start as u32, (end - start) as u32)
    }

    /// Scan a name, returning its span (possibly empty)
    #[inline]
    fn name(&mut self) -> Span {
        let start = self.scanner.position();
        let len = self.scanner.skip(CharClass::NAME);
        Span::new(start as u32, len as u32)
    }

    fn leaf(&mut self, kind: NodeKind, name: Span, value: Span) -> NodeId {
        let id = self.doc.create_node(kind);
        let node = self.doc.node_mut(id);
        node.name = name;
        node.value = value;
        id
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Parse the construct after a `<`
    fn parse_node(&mut self) -> Result<NodeId> {
        match self.scanner.peek() {
            None => Err(self.eof("markup")),
            Some(b'?') => {
                self.scanner.advance(1);
                if self.at_xml_declaration() {
                    self.scanner.advance(3);
                    self.parse_declaration()
                } else {
                    self.parse_pi()
                }
            }
            Some(b'!') => {
                self.scanner.advance(1);
                if self.scanner.starts_with(b"--") {
                    self.scanner.advance(2);
                    self.parse_comment()
                } else if self.scanner.starts_with(b"[CDATA[") {
                    self.scanner.advance(7);
                    self.parse_cdata()
                } else if self.scanner.starts_with(b"DOCTYPE")
                    && self
                        .scanner
                        .peek_at(7)
                        .is_some_and(|b| is(b, CharClass::WHITESPACE))
                {
                    self.scanner.advance(7);
                    self.parse_doctype()
                } else if self.scanner.is_eof() {
                    Err(self.eof("markup"))
                } else {
                    // Skip the unknown construct so the position points past it
                    let position = self.scanner.position();
                    if let Some(end) = self.scanner.find_byte(b'>') {
                        self.scanner.set_position(end + 1);
                    }
                    Err(self.error_at(SyntaxError::UnrecognizedNode, position))
                }
            }
            Some(_) => self.parse_element(),
        }
    }

    /// `xml` (any case) followed by whitespace
    fn at_xml_declaration(&self) -> bool {
        let rest = self.scanner.remaining();
        rest.len() >= 4 && rest[..3].eq_ignore_ascii_case(b"xml") && is(rest[3], CharClass::WHITESPACE)
    }

    fn parse_declaration(&mut self) -> Result<NodeId> {
        let node = self.doc.create_node(NodeKind::Declaration);
        self.scanner.skip_whitespace();
        self.parse_attributes(node)?;
        if !self.scanner.starts_with(b"?>") {
            return self.fail(SyntaxError::ExpectedByte {
                expected: "'?>'",
                found: Found(self.scanner.peek()),
            });
        }
        self.scanner.advance(2);
        Ok(node)
    }

    fn parse_pi(&mut self) -> Result<NodeId> {
        let name = self.name();
        if name.is_empty() {
            return self.fail(SyntaxError::MissingName {
                construct: "processing instruction",
            });
        }
        self.scanner.skip_whitespace();

        let start = self.scanner.position();
        let end = self
            .scanner
            .find(b"?>")
            .ok_or_else(|| self.eof("processing instruction"))?;
        self.scanner.set_position(end + 2);
        Ok(self.leaf(NodeKind::Pi, name, Self::span(start, end)))
    }

    fn parse_comment(&mut self) -> Result<NodeId> {
        let start = self.scanner.position();
        let end = self.scanner.find(b"--").ok_or_else(|| self.eof("comment"))?;
        self.scanner.set_position(end + 2);
        if self.scanner.peek() != Some(b'>') {
            return Err(self.error_at(SyntaxError::DoubleHyphenInComment, end));
        }
        self.scanner.advance(1);
        Ok(self.leaf(NodeKind::Comment, Span::EMPTY, Self::span(start, end)))
    }

    fn parse_cdata(&mut self) -> Result<NodeId> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find(b"]]")
            .ok_or_else(|| self.eof("CDATA section"))?;
        self.scanner.set_position(end + 2);
        self.expect(b'>', "'>' after ']]'")?;
        Ok(self.leaf(NodeKind::Cdata, Span::EMPTY, Self::span(start, end)))
    }

    /// Scan to the `>` closing the DOCTYPE. Brackets of the internal subset
    /// are counted, except inside `<!...>` markup declarations.
    fn parse_doctype(&mut self) -> Result<NodeId> {
        self.scanner.skip_whitespace();
        let start = self.scanner.position();
        let mut brackets = 0usize;
        let mut in_declaration = false;

        loop {
            match self.scanner.peek() {
                None => return Err(self.eof("DOCTYPE")),
                Some(b'>') if brackets == 0 => break,
                Some(b'>') => in_declaration = false,
                Some(b'[') if !in_declaration => brackets += 1,
                Some(b']') if !in_declaration => brackets = brackets.saturating_sub(1),
                Some(b'<') if self.scanner.peek_at(1) == Some(b'!') => in_declaration = true,
                Some(_) => {}
            }
            self.scanner.advance(1);
        }

        let end = self.scanner.position();
        self.scanner.advance(1);
        Ok(self.leaf(NodeKind::Doctype, Span::EMPTY, Self::span(start, end)))
    }

    fn parse_element(&mut self) -> Result<NodeId> {
        if self.depth >= self.options.max_depth {
            let position = self.scanner.position();
            return Err(Error::TooDeep {
                depth: self.options.max_depth,
                position,
                context: ErrorContext::capture(self.scanner.input(), position),
            });
        }

        let name = self.name();
        if name.is_empty() {
            return self.fail(SyntaxError::MissingName { construct: "element" });
        }
        let element = self.leaf(NodeKind::Element, name, Span::EMPTY);

        self.scanner.skip_whitespace();
        self.parse_attributes(element)?;

        match self.scanner.peek() {
            Some(b'>') => {
                self.scanner.advance(1);
                self.depth += 1;
                self.parse_content(element, name)?;
                self.depth -= 1;
            }
            Some(b'/') => {
                self.scanner.advance(1);
                self.expect(b'>', "'>' after '/'")?;
            }
            found => {
                return self.fail(SyntaxError::ExpectedByte {
                    expected: "'>' or '/>'",
                    found: Found(found),
                })
            }
        }
        Ok(element)
    }

    /// `name = 'value'` pairs, values decoded in place
    fn parse_attributes(&mut self, node: NodeId) -> Result<()> {
        while self
            .scanner
            .peek()
            .is_some_and(|b| is(b, CharClass::NAME))
        {
            let name = self.name();
            self.scanner.skip_whitespace();
            self.expect(b'=', "'='")?;
            self.scanner.skip_whitespace();

            let quote = match self.scanner.peek() {
                Some(q @ (b'\'' | b'"')) => q,
                found => {
                    return self.fail(SyntaxError::ExpectedByte {
                        expected: "quote",
                        found: Found(found),
                    })
                }
            };
            self.scanner.advance(1);

            let (class, pure) = attribute_classes(quote);
            let value = self
                .scanner
                .expand(class, pure)
                .ok_or_else(|| self.eof("attribute value"))?;
            if self.scanner.peek() != Some(quote) {
                return self.fail(SyntaxError::ExpectedByte {
                    expected: "closing quote",
                    found: Found(self.scanner.peek()),
                });
            }
            self.scanner.advance(1);
            self.scanner.skip_whitespace();

            let attr = self
                .doc
                .new_attribute(name, Span::new(value.start as u32, value.len as u32));
            self.doc.append_attribute(node, attr);
        }
        Ok(())
    }

    /// Children and text up to and including the closing tag
    fn parse_content(&mut self, element: NodeId, name: Span) -> Result<()> {
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None => return Err(self.eof("element content")),
                Some(b'<') if self.scanner.peek_at(1) == Some(b'/') => {
                    self.scanner.advance(2);
                    let closing = self.name();
                    if self.options.validate_closing_tags {
                        let input = self.scanner.input();
                        let found = closing.slice(input);
                        let expected = name.slice(input);
                        if found != expected {
                            let kind = SyntaxError::MismatchedClosingTag {
                                expected: String::from_utf8_lossy(expected).into_owned(),
                                found: String::from_utf8_lossy(found).into_owned(),
                            };
                            return Err(self.error_at(kind, closing.offset as usize));
                        }
                    }
                    self.scanner.skip_whitespace();
                    return self.expect(b'>', "'>'");
                }
                Some(b'<') => {
                    self.scanner.advance(1);
                    let child = self.parse_node()?;
                    self.doc.append_child(element, child);
                }
                Some(0) => return self.fail(SyntaxError::UnexpectedNul),
                Some(_) => self.parse_data(element)?,
            }
        }
    }

    /// One text run, appended as a Data child; the first run is also the
    /// element's value
    fn parse_data(&mut self, element: NodeId) -> Result<()> {
        let run = self
            .scanner
            .expand(CharClass::TEXT, CharClass::TEXT_PURE)
            .ok_or_else(|| self.eof("element content"))?;
        let value = Span::new(run.start as u32, run.len as u32);

        let data = self.leaf(NodeKind::Data, Span::EMPTY, value);
        self.doc.append_child(element, data);

        let node = self.doc.node_mut(element);
        if node.value.is_empty() {
            node.value = value;
        }
        Ok(())
    }
}
