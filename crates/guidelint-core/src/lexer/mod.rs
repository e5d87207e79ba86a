//! Tokenizer for JavaScript, CSS and HTML source text
//!
//! Every byte of the input ends up in exactly one token, so joining the text of
//! all tokens reproduces the source. Whitespace, newlines and comments are kept
//! because several rules inspect them.

mod css;
mod cursor;
mod html;
mod javascript;

use serde::Serialize;

use crate::language::Language;

pub(crate) use cursor::Cursor;

/// A 1-based line/column pair. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Byte range in the source plus the matching start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_pos: Position,
    pub end_pos: Position,
}

impl Span {
    pub fn new(start: usize, end: usize, start_pos: Position, end_pos: Position) -> Self {
        Self {
            start,
            end,
            start_pos,
            end_pos,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            start_pos: self.start_pos,
            end_pos: other.end_pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    String,
    Number,
    Punctuation,
    Comment,
    /// Spaces and tabs; never contains a line break.
    Whitespace,
    /// `\n` or `\r\n`.
    Newline,
    Regex,
    /// HTML character data, including raw `<script>`/`<style>` bodies.
    Text,
    /// HTML `<!DOCTYPE ...>`.
    Directive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn line(&self) -> usize {
        self.span.start_pos.line
    }

    pub fn column(&self) -> usize {
        self.span.start_pos.column
    }

    /// Whitespace, newlines and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    pub(crate) fn new(message: impl Into<String>, at: Position) -> Self {
        Self {
            message: message.into(),
            line: at.line,
            column: at.column,
        }
    }
}

/// Split `source` into tokens according to the grammar of `language`.
pub fn tokenize(source: &str, language: Language) -> Result<Vec<Token>, LexError> {
    let tokens = match language {
        Language::JavaScript => javascript::tokenize(source)?,
        Language::Css => css::tokenize(source)?,
        Language::Html => html::tokenize(source)?,
    };
    tracing::trace!(%language, count = tokens.len(), "tokenized source");
    Ok(tokens)
}

/// Concatenate token texts; the inverse of [`tokenize`].
pub fn reconstruct(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        out.push_str(&token.text);
    }
    out
}
