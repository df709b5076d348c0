// SPDX-License-Identifier: Apache-2.0

use core::fmt::Write;

use log::debug;

use crate::doc::FlatDoc;
use crate::error::{ErrorLog, ParseStatus};
use crate::node::Node;
use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// Newlines of surrounding source included on each side of a failing
/// token in the diagnostic context window.
const CONTEXT_NEWLINES: usize = 3;

/// Parses one document into a caller-supplied node buffer.
///
/// The parser owns no storage beyond a bounded diagnostic buffer. Nodes
/// land in the `&mut [Node]` handed to [`Parser::parse`]; a buffer that
/// turns out too small is reported as [`ParseStatus::CapacityExceeded`]
/// and the caller retries with a larger one.
///
/// # Example
/// ```
/// use flatjson::{Node, ParseStatus, Parser};
///
/// let mut nodes = [Node::default(); 8];
/// let mut parser = Parser::new("[1, 2]");
/// assert_eq!(parser.parse(&mut nodes), ParseStatus::Valid);
/// assert_eq!(parser.node_count(), 4); // array, two numbers, end of stream
/// ```
pub struct Parser<'a> {
    input: &'a str,
    tokenizer: Tokenizer<'a>,
    status: ParseStatus,
    node_count: usize,
    log: ErrorLog,
    failing: Option<Token<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            tokenizer: Tokenizer::new(input),
            status: ParseStatus::NotDone,
            node_count: 0,
            log: ErrorLog::new(),
            failing: None,
        }
    }

    /// Status of the most recent parse attempt.
    pub fn status(&self) -> ParseStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == ParseStatus::Valid
    }

    /// Nodes written by the most recent parse attempt.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Accumulated diagnostics; empty when nothing went wrong.
    pub fn error_message(&self) -> &str {
        self.log.as_str()
    }

    /// Parses the document into `nodes` and returns the terminal status.
    ///
    /// A parser that already reached [`ParseStatus::Valid`] returns it
    /// again without touching the buffer. Any other prior status restarts
    /// tokenization from the beginning; partial attempts do not resume.
    pub fn parse(&mut self, nodes: &mut [Node<'a>]) -> ParseStatus {
        if self.status == ParseStatus::Valid {
            return self.status;
        }
        self.reset();
        debug!(
            "parsing {} bytes into a {}-node buffer",
            self.input.len(),
            nodes.len()
        );

        let mut token = self.next_token();
        let opened = matches!(token.kind, TokenKind::ArrayBegin | TokenKind::ObjectBegin);
        let mut ok = self.expect(nodes, &mut token, opened, "array or object expected")
            && self.push_node(nodes, &token);
        if ok {
            ok = match token.kind {
                TokenKind::ArrayBegin => self.parse_array(nodes),
                _ => self.parse_object(nodes),
            };
        }
        if ok {
            let mut end = self.next_token();
            let at_end = end.kind == TokenKind::EndOfStream;
            ok = self.expect(nodes, &mut end, at_end, "end of document expected")
                && self.push_node(nodes, &end);
        }

        if ok {
            self.status = ParseStatus::Valid;
        } else if self.status == ParseStatus::SyntacticErrors {
            if let Some(failing) = self.failing {
                self.log_error_context(&failing);
            }
        }
        debug!("parse finished {:?} with {} nodes", self.status, self.node_count);
        self.status
    }

    /// Parses into a [`FlatDoc`]'s inline buffer and records the count.
    pub fn parse_doc<const N: usize>(&mut self, doc: &mut FlatDoc<'a, N>) -> ParseStatus {
        let status = self.parse(doc.buffer_mut());
        doc.set_len(self.node_count);
        status
    }

    fn reset(&mut self) {
        self.tokenizer.reset();
        self.status = ParseStatus::NotDone;
        self.node_count = 0;
        self.log.clear();
        self.failing = None;
    }

    fn next_token(&mut self) -> Token<'a> {
        self.tokenizer.next_token(&mut self.log)
    }

    /// The element list of an array whose opening node was just pushed.
    /// Elements chain to each other through their successor links.
    fn parse_array(&mut self, nodes: &mut [Node<'a>]) -> bool {
        let mut token = self.next_token();
        if token.kind == TokenKind::ArrayEnd {
            return true;
        }
        let array = self.node_count - 1;
        let mut previous: Option<usize> = None;
        loop {
            let reason = if previous.is_none() {
                "value or array end expected"
            } else {
                "value expected"
            };
            let is_value = is_value_token(token.kind);
            if !self.expect(nodes, &mut token, is_value, reason) {
                return false;
            }
            if !self.push_node(nodes, &token) {
                return false;
            }
            let element = self.node_count - 1;
            nodes[array].bump_count();
            if let Some(prev) = previous {
                nodes[prev].set_successor(element);
            }
            previous = Some(element);

            let descended = match token.kind {
                TokenKind::ArrayBegin => self.parse_array(nodes),
                TokenKind::ObjectBegin => self.parse_object(nodes),
                _ => true,
            };
            if !descended {
                return false;
            }

            token = self.next_token();
            if token.kind == TokenKind::ArrayEnd {
                return true;
            }
            let is_comma = token.kind == TokenKind::Comma;
            if !self.expect(nodes, &mut token, is_comma, "comma or array end expected") {
                return false;
            }
            token = self.next_token();
        }
    }

    /// The member list of an object whose opening node was just pushed.
    /// Keys chain to the next key, values to the next member's value.
    fn parse_object(&mut self, nodes: &mut [Node<'a>]) -> bool {
        let mut token = self.next_token();
        if token.kind == TokenKind::ObjectEnd {
            return true;
        }
        let object = self.node_count - 1;
        let mut previous_key: Option<usize> = None;
        let mut previous_value: Option<usize> = None;
        loop {
            let reason = if previous_key.is_none() {
                "string (key) or object end expected"
            } else {
                "string (key) expected"
            };
            let is_key = token.kind == TokenKind::String;
            if !self.expect(nodes, &mut token, is_key, reason) {
                return false;
            }
            token.kind = TokenKind::Key;
            if !self.push_node(nodes, &token) {
                return false;
            }
            let key = self.node_count - 1;
            if let Some(prev) = previous_key {
                nodes[prev].set_successor(key);
            }
            previous_key = Some(key);

            token = self.next_token();
            let is_colon = token.kind == TokenKind::Colon;
            if !self.expect(nodes, &mut token, is_colon, "colon expected") {
                return false;
            }

            token = self.next_token();
            let is_value = is_value_token(token.kind);
            if !self.expect(nodes, &mut token, is_value, "value expected") {
                return false;
            }
            if !self.push_node(nodes, &token) {
                return false;
            }
            let value = self.node_count - 1;
            nodes[object].bump_count();
            if let Some(prev) = previous_value {
                nodes[prev].set_successor(value);
            }
            previous_value = Some(value);

            let descended = match token.kind {
                TokenKind::ArrayBegin => self.parse_array(nodes),
                TokenKind::ObjectBegin => self.parse_object(nodes),
                _ => true,
            };
            if !descended {
                return false;
            }

            token = self.next_token();
            if token.kind == TokenKind::ObjectEnd {
                return true;
            }
            let is_comma = token.kind == TokenKind::Comma;
            if !self.expect(nodes, &mut token, is_comma, "comma or object end expected") {
                return false;
            }
            token = self.next_token();
        }
    }

    /// Grammar expectation check. On failure the token is re-tagged, the
    /// status and diagnostics recorded, and the error node pushed so the
    /// buffer always ends with the failure marker.
    fn expect(
        &mut self,
        nodes: &mut [Node<'a>],
        token: &mut Token<'a>,
        matched: bool,
        reason: &str,
    ) -> bool {
        if matched {
            return true;
        }
        if token.kind == TokenKind::Invalid {
            // The tokenizer already logged the lexical failure.
            self.status = ParseStatus::InvalidTokens;
        } else {
            token.kind = TokenKind::SyntaxError;
            self.status = ParseStatus::SyntacticErrors;
            self.failing = Some(*token);
            let _ = writeln!(self.log, "syntax error at line {}: {}", token.line, reason);
        }
        self.push_node(nodes, token);
        false
    }

    /// The single point where nodes enter the buffer; overflow turns the
    /// attempt into [`ParseStatus::CapacityExceeded`].
    fn push_node(&mut self, nodes: &mut [Node<'a>], token: &Token<'a>) -> bool {
        if self.node_count >= nodes.len() {
            self.status = ParseStatus::CapacityExceeded;
            let _ = writeln!(self.log, "node buffer capacity exceeded");
            return false;
        }
        nodes[self.node_count] = Node::from_token(token);
        self.node_count += 1;
        true
    }

    /// Appends the source window around the failing token, extending up
    /// to [`CONTEXT_NEWLINES`] newlines away on each side.
    fn log_error_context(&mut self, token: &Token<'a>) {
        let bytes = self.input.as_bytes();
        let start = token.start;
        let end = token.start + token.text.len();

        let mut context_start = start;
        let mut newlines = 0;
        while context_start > 0 && newlines < CONTEXT_NEWLINES {
            context_start -= 1;
            if bytes[context_start] == b'\n' {
                newlines += 1;
            }
        }

        let mut context_end = end;
        let mut newlines = 0;
        while context_end < bytes.len() {
            if bytes[context_end] == b'\n' {
                newlines += 1;
                if newlines == CONTEXT_NEWLINES {
                    break;
                }
            }
            context_end += 1;
        }

        let before = &self.input[context_start..start];
        let after = &self.input[end..context_end];
        let _ = write!(
            self.log,
            "...\n{} >>> {} <<< {}\n...\n",
            before, token.text, after
        );
    }
}

fn is_value_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::ArrayBegin
            | TokenKind::ObjectBegin
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::Number
            | TokenKind::FloatHex
            | TokenKind::DoubleHex
            | TokenKind::String
    )
}
