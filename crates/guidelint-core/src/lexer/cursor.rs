//! Character cursor shared by the per-language tokenizers.

use super::{Position, Span, Token, TokenKind};

pub(crate) struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    token_start: usize,
    token_start_pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            token_start: 0,
            token_start_pos: Position::START,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn starts_with_ignore_case(&self, prefix: &str) -> bool {
        let rest = self.rest();
        rest.len() >= prefix.len()
            && rest.is_char_boundary(prefix.len())
            && rest[..prefix.len()].eq_ignore_ascii_case(prefix)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    /// Consume `prefix` when the input starts with it.
    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.bump_n(prefix.chars().count());
            true
        } else {
            false
        }
    }

    pub fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
    }

    pub fn at_newline(&self) -> bool {
        self.starts_with("\n") || self.starts_with("\r\n")
    }

    pub fn at_inline_whitespace(&self) -> bool {
        match self.peek() {
            Some('\r') => !self.starts_with("\r\n"),
            Some(c) => c != '\n' && c.is_whitespace(),
            None => false,
        }
    }

    /// Mark the start of the next token.
    pub fn begin(&mut self) {
        self.token_start = self.offset;
        self.token_start_pos = self.position();
    }

    pub fn token_start_pos(&self) -> Position {
        self.token_start_pos
    }

    /// Emit everything consumed since [`Cursor::begin`] as one token.
    pub fn emit(&mut self, kind: TokenKind) {
        if self.offset == self.token_start {
            return;
        }
        let span = Span::new(
            self.token_start,
            self.offset,
            self.token_start_pos,
            self.position(),
        );
        self.tokens.push(Token {
            kind,
            text: self.source[self.token_start..self.offset].to_string(),
            span,
        });
        self.begin();
    }

    /// Consume and emit a newline or inline-whitespace run if one starts here.
    pub fn lex_layout(&mut self) -> bool {
        if self.at_newline() {
            self.begin();
            if self.peek() == Some('\r') {
                self.bump();
            }
            self.bump();
            self.emit(TokenKind::Newline);
            true
        } else if self.at_inline_whitespace() {
            self.begin();
            while self.at_inline_whitespace() {
                self.bump();
            }
            self.emit(TokenKind::Whitespace);
            true
        } else {
            false
        }
    }

    pub fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn last_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| !t.is_trivia())
    }

    pub fn finish(self) -> Vec<Token> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\nc");
        cursor.bump_n(3);
        assert_eq!(cursor.position(), Position::new(2, 1));
        cursor.bump();
        assert_eq!(cursor.position(), Position::new(2, 2));
        assert!(cursor.is_eof());
    }

    #[test]
    fn emit_skips_empty_tokens() {
        let mut cursor = Cursor::new("x");
        cursor.begin();
        cursor.emit(TokenKind::Identifier);
        assert!(cursor.finish().is_empty());
    }

    #[test]
    fn lex_layout_splits_whitespace_and_newline() {
        let mut cursor = Cursor::new(" \t\r\n");
        assert!(cursor.lex_layout());
        assert!(cursor.lex_layout());
        assert!(!cursor.lex_layout());
        let tokens = cursor.finish();
        assert_eq!(tokens[0].kind, TokenKind::Whitespace);
        assert_eq!(tokens[0].text, " \t");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].text, "\r\n");
    }

    #[test]
    fn starts_with_ignore_case_matches_ascii() {
        let cursor = Cursor::new("<!doctype html>");
        assert!(cursor.starts_with_ignore_case("<!DOCTYPE"));
        assert!(!cursor.starts_with_ignore_case("<!DOCTYPEX"));
    }
}
