// SPDX-License-Identifier: Apache-2.0

// Hand-rolled lexer for the JSON superset: standard JSON tokens plus
// hex-encoded lossless floats. Spans borrow from the input, nothing is
// copied out.

use core::fmt::Write;

use log::trace;

use crate::convert::{hex_digit, is_high_surrogate, is_low_surrogate, utf8_len};
use crate::error::ErrorLog;

/// Lexical classification of one source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Nothing lexable; the span covers the rejected bytes.
    Invalid,
    ArrayBegin,
    ArrayEnd,
    ObjectBegin,
    ObjectEnd,
    Colon,
    Comma,
    True,
    False,
    Null,
    Number,
    /// `0x` plus 8 hex digits, the bit pattern of an `f32`.
    FloatHex,
    /// `0x` plus 16 hex digits, the bit pattern of an `f64`.
    DoubleHex,
    String,
    /// Assigned by the parser to a string in member-name position.
    Key,
    EndOfStream,
    /// Assigned by the parser to a token hitting a grammar violation.
    SyntaxError,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the span within the input.
    pub start: usize,
    /// 1-based line the span starts on.
    pub line: usize,
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
    }

    /// Lexes the next span. Lexical failures are reported into `log` and
    /// come back as [`TokenKind::Invalid`] tokens covering the rejected
    /// bytes, so the caller always makes progress.
    pub fn next_token(&mut self, log: &mut ErrorLog) -> Token<'a> {
        self.skip_whitespace();
        let start = self.pos;
        let line = self.line;

        let matched: Result<TokenKind, &'static str> = match self.peek(self.pos) {
            None => Ok(TokenKind::EndOfStream),
            Some(b'[') => self.single(TokenKind::ArrayBegin),
            Some(b']') => self.single(TokenKind::ArrayEnd),
            Some(b'{') => self.single(TokenKind::ObjectBegin),
            Some(b'}') => self.single(TokenKind::ObjectEnd),
            Some(b':') => self.single(TokenKind::Colon),
            Some(b',') => self.single(TokenKind::Comma),
            Some(b'"') => self.match_string(),
            Some(b't') => self.match_literal(b"rue", TokenKind::True, "true"),
            Some(b'f') => self.match_literal(b"alse", TokenKind::False, "false"),
            Some(b'n') => self.match_literal(b"ull", TokenKind::Null, "null"),
            Some(b) if b == b'-' || b.is_ascii_digit() => {
                if self.peek(self.pos + 1) == Some(b'x') {
                    self.match_hex_float()
                } else {
                    self.match_number()
                }
            }
            Some(_) => {
                let _ = writeln!(log, "invalid token at line {}", line);
                Ok(TokenKind::Invalid)
            }
        };

        let kind = match matched {
            Ok(kind) => kind,
            Err(expected) => {
                let _ = writeln!(log, "invalid token at line {}: {} expected", line, expected);
                TokenKind::Invalid
            }
        };
        if kind == TokenKind::Invalid {
            self.skip_to_boundary();
        }

        let text = &self.input[start..self.pos];
        trace!("token {:?} {:?} at line {}", kind, text, line);
        Token {
            kind,
            text,
            start,
            line,
        }
    }

    fn peek(&self, at: usize) -> Option<u8> {
        self.input.as_bytes().get(at).copied()
    }

    fn single(&mut self, kind: TokenKind) -> Result<TokenKind, &'static str> {
        self.pos += 1;
        Ok(kind)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek(self.pos) {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    /// Recovery after a lexical failure: consume at least one byte, then
    /// everything up to the next plausible token start.
    fn skip_to_boundary(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
        while self.peek(self.pos).is_some_and(|b| !is_boundary(b)) {
            self.pos += 1;
        }
    }

    fn match_literal(
        &mut self,
        rest: &'static [u8],
        kind: TokenKind,
        name: &'static str,
    ) -> Result<TokenKind, &'static str> {
        // The first byte was matched by the dispatch.
        self.pos += 1;
        for &expected in rest {
            if self.peek(self.pos) != Some(expected) {
                return Err(name);
            }
            self.pos += 1;
        }
        Ok(kind)
    }

    fn match_number(&mut self) -> Result<TokenKind, &'static str> {
        if self.peek(self.pos) == Some(b'-') {
            self.pos += 1;
        }
        // Integer part; a leading zero stands alone.
        match self.peek(self.pos) {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.pos += 1;
                self.eat_digits();
            }
            _ => return Err("number"),
        }
        if self.peek(self.pos) == Some(b'.') {
            self.pos += 1;
            if !self.eat_digits() {
                return Err("number");
            }
        }
        if matches!(self.peek(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.eat_digits() {
                return Err("number");
            }
        }
        Ok(TokenKind::Number)
    }

    /// Consumes a digit run, reporting whether at least one was present.
    fn eat_digits(&mut self) -> bool {
        let mut any = false;
        while self.peek(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            any = true;
        }
        any
    }

    /// Lossless float: the dispatch byte, `x`, then exactly 8 or 16 hex
    /// digits selecting the 32- or 64-bit form.
    fn match_hex_float(&mut self) -> Result<TokenKind, &'static str> {
        self.pos += 2;
        let mut digits = 0;
        while self.peek(self.pos).is_some_and(|b| b.is_ascii_hexdigit()) {
            self.pos += 1;
            digits += 1;
        }
        match digits {
            8 => Ok(TokenKind::FloatHex),
            16 => Ok(TokenKind::DoubleHex),
            _ => Err("floating point number in hexadecimal"),
        }
    }

    fn match_string(&mut self) -> Result<TokenKind, &'static str> {
        self.pos += 1;
        loop {
            let b = match self.peek(self.pos) {
                Some(b) => b,
                None => return Err("string"),
            };
            match b {
                b'"' => {
                    self.pos += 1;
                    return Ok(TokenKind::String);
                }
                b'\\' => {
                    self.pos += 1;
                    if !self.match_escape() {
                        return Err("string");
                    }
                }
                // A solidus must appear as the \/ escape.
                b'/' => return Err("string"),
                b if b < 0x20 => return Err("string"),
                b if b < 0x80 => self.pos += 1,
                lead => {
                    let len = utf8_len(lead);
                    if len == 0 || self.pos + len > self.input.len() {
                        return Err("string");
                    }
                    self.pos += len;
                }
            }
        }
    }

    fn match_escape(&mut self) -> bool {
        match self.peek(self.pos) {
            Some(
                b'\\' | b'/' | b'"' | b'0' | b'a' | b'b' | b't' | b'v' | b'f' | b'r' | b'n',
            ) => {
                self.pos += 1;
                true
            }
            Some(b'u') => {
                self.pos += 1;
                self.match_unicode_escape()
            }
            _ => false,
        }
    }

    /// `\u` was consumed. Exactly four hex digits follow; a high surrogate
    /// must be completed by an immediately following low surrogate.
    fn match_unicode_escape(&mut self) -> bool {
        let high = match self.match_hex4() {
            Some(v) => v,
            None => return false,
        };
        if is_low_surrogate(high) {
            return false;
        }
        if is_high_surrogate(high) {
            if self.peek(self.pos) != Some(b'\\') || self.peek(self.pos + 1) != Some(b'u') {
                return false;
            }
            self.pos += 2;
            match self.match_hex4() {
                Some(low) => is_low_surrogate(low),
                None => false,
            }
        } else {
            true
        }
    }

    fn match_hex4(&mut self) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let d = hex_digit(self.peek(self.pos)?)?;
            value = (value << 4) | d;
            self.pos += 1;
        }
        Some(value)
    }
}

/// Bytes that plausibly start a fresh token; invalid-span recovery stops
/// at the first one.
const fn is_boundary(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t'
            | b'\n'
            | b'\r'
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b':'
            | b','
            | b'0'..=b'9'
            | b't'
            | b'f'
            | b'n'
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn lex_all(input: &str) -> Vec<(TokenKind, String)> {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(input);
        let mut out = Vec::new();
        loop {
            let token = tokenizer.next_token(&mut log);
            let done = token.kind == TokenKind::EndOfStream;
            out.push((token.kind, token.text.to_string()));
            if done {
                break;
            }
        }
        out
    }

    fn lex_one(input: &str) -> (TokenKind, String, String) {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new(input);
        let token = tokenizer.next_token(&mut log);
        (token.kind, token.text.to_string(), log.as_str().to_string())
    }

    #[test]
    fn structural_tokens() {
        let tokens = lex_all("[]{},:");
        let kinds: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::ArrayBegin,
                TokenKind::ArrayEnd,
                TokenKind::ObjectBegin,
                TokenKind::ObjectEnd,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn keyword_literals() {
        assert_eq!(lex_one("true").0, TokenKind::True);
        assert_eq!(lex_one("false").0, TokenKind::False);
        assert_eq!(lex_one("null").0, TokenKind::Null);
    }

    #[test]
    fn misspelled_literals_are_invalid() {
        let (kind, _, log) = lex_one("tru");
        assert_eq!(kind, TokenKind::Invalid);
        assert_eq!(log, "invalid token at line 1: true expected\n");

        let (kind, _, log) = lex_one("nulL");
        assert_eq!(kind, TokenKind::Invalid);
        assert!(log.contains("null expected"));
    }

    #[test]
    fn numbers() {
        for src in ["0", "-0", "42", "-17", "3.25", "-0.5", "1e6", "2.5E-3", "9e+2"] {
            let (kind, text, _) = lex_one(src);
            assert_eq!(kind, TokenKind::Number, "{}", src);
            assert_eq!(text, src);
        }
    }

    #[test]
    fn number_stops_at_second_fraction() {
        // "1.2.3" lexes as the number 1.2; the rest is a separate, bad span.
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new("1.2.3");
        let first = tokenizer.next_token(&mut log);
        assert_eq!(first.kind, TokenKind::Number);
        assert_eq!(first.text, "1.2");
        let second = tokenizer.next_token(&mut log);
        assert_eq!(second.kind, TokenKind::Invalid);
    }

    #[test]
    fn malformed_numbers_are_invalid() {
        for src in ["-", "1.", "2e", "3e+", "-.5"] {
            let (kind, _, log) = lex_one(src);
            assert_eq!(kind, TokenKind::Invalid, "{}", src);
            assert!(log.contains("number expected"), "{}", src);
        }
    }

    #[test]
    fn hex_floats() {
        let (kind, text, _) = lex_one("0x4048f5c3");
        assert_eq!(kind, TokenKind::FloatHex);
        assert_eq!(text, "0x4048f5c3");

        let (kind, text, _) = lex_one("0x40091eb851eb851f");
        assert_eq!(kind, TokenKind::DoubleHex);
        assert_eq!(text, "0x40091eb851eb851f");

        // Any digit or minus may carry the x prefix.
        assert_eq!(lex_one("7xDEADBEEF").0, TokenKind::FloatHex);
        assert_eq!(lex_one("-x80000000").0, TokenKind::FloatHex);
    }

    #[test]
    fn hex_float_digit_count_is_exact() {
        for src in ["0x", "0x1234", "0x123456789", "0x123456789abcdef01"] {
            let (kind, _, log) = lex_one(src);
            assert_eq!(kind, TokenKind::Invalid, "{}", src);
            assert!(
                log.contains("floating point number in hexadecimal expected"),
                "{}",
                src
            );
        }
    }

    #[test]
    fn strings() {
        let (kind, text, _) = lex_one(r#""hello""#);
        assert_eq!(kind, TokenKind::String);
        assert_eq!(text, r#""hello""#);

        let (kind, text, _) = lex_one(r#""a\tbA\\""#);
        assert_eq!(kind, TokenKind::String);
        assert_eq!(text, r#""a\tbA\\""#);
    }

    #[test]
    fn string_accepts_raw_multibyte() {
        let (kind, text, _) = lex_one("\"caf\u{E9} \u{20AC}\"");
        assert_eq!(kind, TokenKind::String);
        assert_eq!(text, "\"caf\u{E9} \u{20AC}\"");
    }

    #[test]
    fn string_rejects_raw_solidus() {
        let (kind, _, log) = lex_one(r#""a/b""#);
        assert_eq!(kind, TokenKind::Invalid);
        assert!(log.contains("string expected"));

        assert_eq!(lex_one(r#""a\/b""#).0, TokenKind::String);
    }

    #[test]
    fn string_rejects_raw_controls() {
        assert_eq!(lex_one("\"a\tb\"").0, TokenKind::Invalid);
        assert_eq!(lex_one("\"a\nb\"").0, TokenKind::Invalid);
    }

    #[test]
    fn string_rejects_unterminated() {
        let (kind, _, log) = lex_one(r#""abc"#);
        assert_eq!(kind, TokenKind::Invalid);
        assert!(log.contains("string expected"));
    }

    #[test]
    fn string_rejects_unknown_escapes() {
        assert_eq!(lex_one(r#""\q""#).0, TokenKind::Invalid);
        assert_eq!(lex_one(r#""\u12""#).0, TokenKind::Invalid);
        assert_eq!(lex_one(r#""\u12G4""#).0, TokenKind::Invalid);
    }

    #[test]
    fn string_surrogate_pairs() {
        assert_eq!(lex_one(r#""\uD834\uDD1E""#).0, TokenKind::String);
        // A high half alone, or out of order, is not a character.
        assert_eq!(lex_one(r#""\uD834""#).0, TokenKind::Invalid);
        assert_eq!(lex_one(r#""\uD834A""#).0, TokenKind::Invalid);
        assert_eq!(lex_one(r#""\uDD1E""#).0, TokenKind::Invalid);
    }

    #[test]
    fn invalid_span_skips_to_boundary() {
        let tokens = lex_all("@#$ true");
        assert_eq!(tokens[0].0, TokenKind::Invalid);
        assert_eq!(tokens[0].1, "@#$");
        assert_eq!(tokens[1].0, TokenKind::True);
    }

    #[test]
    fn invalid_span_stops_at_structural_byte() {
        let tokens = lex_all("@@,1");
        assert_eq!(tokens[0].1, "@@");
        assert_eq!(tokens[1].0, TokenKind::Comma);
        assert_eq!(tokens[2].0, TokenKind::Number);
    }

    #[test]
    fn line_counting() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new("[\n  1,\n  @\n]");
        loop {
            let token = tokenizer.next_token(&mut log);
            if token.kind == TokenKind::Invalid {
                assert_eq!(token.line, 3);
            }
            if token.kind == TokenKind::EndOfStream {
                break;
            }
        }
        assert_eq!(log.as_str(), "invalid token at line 3\n");
    }

    #[test]
    fn end_of_stream_has_empty_span() {
        let mut log = ErrorLog::new();
        let mut tokenizer = Tokenizer::new("  \n ");
        let token = tokenizer.next_token(&mut log);
        assert_eq!(token.kind, TokenKind::EndOfStream);
        assert_eq!(token.text, "");
        assert_eq!(token.line, 2);
        // Streams stay at the end once there.
        assert_eq!(
            tokenizer.next_token(&mut log).kind,
            TokenKind::EndOfStream
        );
    }

    #[test]
    fn whitespace_between_tokens() {
        let tokens = lex_all(" [ \t1 ,\r\n2 ] ");
        let kinds: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::ArrayBegin,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::ArrayEnd,
                TokenKind::EndOfStream,
            ]
        );
    }
}
