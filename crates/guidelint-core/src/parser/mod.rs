//! Parsers for JavaScript, CSS and HTML
//!
//! Each grammar lives in its own module and shares only the token and syntax
//! node types. Parsers accept legal-but-discouraged code (missing semicolons,
//! leading commas, unquoted attributes) and reject only what the grammar
//! itself forbids.

mod css;
mod html;
mod javascript;

use std::ops::Range;
use std::sync::OnceLock;

use crate::disable_comments::DisableDirectives;
use crate::language::Language;
use crate::lexer::{self, LexError, Position, Span, Token, TokenKind};
use crate::syntax::{NodeKind, SyntaxNode};

/// Deepest nesting a file may have: statements in statements, expressions in
/// expressions, rules in rules, elements in elements. Parsing and checking run
/// on threads with [`PIPELINE_STACK_SIZE`](crate::checker::PIPELINE_STACK_SIZE)
/// bytes of stack, which covers this depth in unoptimized builds.
pub(crate) const MAX_NESTING_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, at: Position) -> Self {
        Self {
            line: at.line,
            column: at.column,
            message: message.into(),
        }
    }
}

/// Why a file could not be turned into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SourceError {
    pub fn line(&self) -> usize {
        match self {
            SourceError::Lex(e) => e.line,
            SourceError::Parse(e) => e.line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            SourceError::Lex(e) => e.column,
            SourceError::Parse(e) => e.column,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SourceError::Lex(e) => &e.message,
            SourceError::Parse(e) => &e.message,
        }
    }
}

/// Build the syntax tree for an already tokenized file.
pub fn parse(tokens: &[Token], language: Language) -> Result<SyntaxNode, ParseError> {
    match language {
        Language::JavaScript => javascript::parse(tokens),
        Language::Css => css::parse(tokens),
        Language::Html => html::parse(tokens),
    }
}

/// A tokenized and parsed source file, ready for rules.
pub struct ParsedFile {
    path: String,
    language: Language,
    source: String,
    tokens: Vec<Token>,
    root: SyntaxNode,
    disable_directives: DisableDirectives,
    line_ranges: OnceLock<Vec<Range<usize>>>,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("token_count", &self.tokens.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn parse(path: &str, source: &str, language: Language) -> Result<Self, SourceError> {
        let tokens = lexer::tokenize(source, language)?;
        let root = parse(&tokens, language)?;
        let disable_directives = DisableDirectives::from_tokens(&tokens);

        Ok(Self {
            path: path.to_string(),
            language,
            source: source.to_string(),
            tokens,
            root,
            disable_directives,
            line_ranges: OnceLock::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn disable_directives(&self) -> &DisableDirectives {
        &self.disable_directives
    }

    /// Closest non-trivia token before index `index`.
    pub fn previous_significant(&self, index: usize) -> Option<(usize, &Token)> {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, t)| !t.is_trivia())
    }

    /// Closest non-trivia token at or after `index`.
    pub fn next_significant(&self, index: usize) -> Option<(usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .skip(index)
            .find(|(_, t)| !t.is_trivia())
    }

    /// First and last token of a node, skipping nothing.
    pub fn node_tokens(&self, node: &SyntaxNode) -> &[Token] {
        let end = node.tokens.end.min(self.tokens.len());
        let start = node.tokens.start.min(end);
        &self.tokens[start..end]
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 {
            return None;
        }

        let ranges = self.line_ranges.get_or_init(|| self.build_line_ranges());
        ranges
            .get(line_number - 1)
            .map(|range| &self.source[range.clone()])
    }

    pub fn line_count(&self) -> usize {
        self.line_ranges
            .get_or_init(|| self.build_line_ranges())
            .len()
    }

    fn build_line_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, c) in self.source.char_indices() {
            if c == '\n' {
                let end = if i > start && self.source.as_bytes()[i - 1] == b'\r' {
                    i - 1
                } else {
                    i
                };
                ranges.push(start..end);
                start = i + 1;
            }
        }

        if start < self.source.len() {
            ranges.push(start..self.source.len());
        }

        ranges
    }
}

/// Span covering every token, used for root nodes.
pub(crate) fn full_span(tokens: &[Token]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.to(last.span),
        _ => Span::new(0, 0, Position::START, Position::START),
    }
}

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Cursor over significant tokens. Trivia is skipped but stays addressable
/// through token indices.
pub(crate) struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
    prev: Option<usize>,
    depth: usize,
    keep_comments: bool,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::build(tokens, false)
    }

    /// Like [`TokenStream::new`], but comments are significant tokens.
    pub fn keeping_comments(tokens: &'t [Token]) -> Self {
        Self::build(tokens, true)
    }

    fn build(tokens: &'t [Token], keep_comments: bool) -> Self {
        let mut stream = Self {
            tokens,
            pos: 0,
            prev: None,
            depth: 0,
            keep_comments,
        };
        stream.skip_trivia();
        stream
    }

    fn is_skipped(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Whitespace | TokenKind::Newline => true,
            TokenKind::Comment => !self.keep_comments,
            _ => false,
        }
    }

    fn skip_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.is_skipped(&self.tokens[self.pos]) {
            self.pos += 1;
        }
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    pub fn index(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// The `n`th significant token after the current one.
    pub fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !self.is_skipped(t))
            .nth(n)
    }

    pub fn bump(&mut self) -> usize {
        let index = self.pos;
        if self.pos < self.tokens.len() {
            self.prev = Some(self.pos);
            self.pos += 1;
            self.skip_trivia();
        }
        index
    }

    /// Index of the last consumed significant token.
    pub fn prev_index(&self) -> Option<usize> {
        self.prev
    }

    /// True when a line break separates the previous and the current token.
    pub fn newline_before(&self) -> bool {
        let from = self.prev.map(|p| p + 1).unwrap_or(0);
        let to = self.pos.min(self.tokens.len());
        self.tokens[from.min(to)..to].iter().any(|t| {
            t.kind == TokenKind::Newline || (t.kind == TokenKind::Comment && t.text.contains('\n'))
        })
    }

    pub fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    pub fn at_punct(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(text))
    }

    pub fn at_ident(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(text))
    }

    pub fn eat_punct(&mut self, text: &str) -> bool {
        if self.at_punct(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn eat_ident(&mut self, text: &str) -> bool {
        if self.at_ident(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect_punct(&mut self, text: &str) -> PResult<usize> {
        if self.at_punct(text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("Expected '{text}'")))
        }
    }

    /// Error at the current token, or at the end of input.
    pub fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::new(
                format!("{expected}, found '{}'", token.text.trim()),
                token.span.start_pos,
            ),
            None => ParseError::new(
                format!("{expected}, found end of input"),
                self.end_position(),
            ),
        }
    }

    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let at = self
            .peek()
            .map(|t| t.span.start_pos)
            .unwrap_or_else(|| self.end_position());
        ParseError::new(message, at)
    }

    fn end_position(&self) -> Position {
        self.tokens
            .last()
            .map(|t| t.span.end_pos)
            .unwrap_or(Position::START)
    }

    /// Node spanning from token `start` through the last consumed token.
    pub fn node(&self, kind: NodeKind, start: usize) -> SyntaxNode {
        let end = match self.prev {
            Some(prev) if prev >= start => prev + 1,
            _ => start,
        };
        SyntaxNode::new(kind, start..end, self.span(start, end))
    }

    /// Node for the tokens `start..end`.
    pub fn node_between(&self, kind: NodeKind, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode::new(kind, start..end.max(start), self.span(start, end))
    }

    /// Node for a single token at `index`.
    pub fn leaf(&self, kind: NodeKind, index: usize) -> SyntaxNode {
        let token = &self.tokens[index];
        SyntaxNode::new(kind, index..index + 1, token.span).with_value(token.text.clone())
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        if end > start && end <= self.tokens.len() {
            self.tokens[start].span.to(self.tokens[end - 1].span)
        } else {
            let at = self
                .tokens
                .get(start)
                .map(|t| (t.span.start, t.span.start_pos))
                .unwrap_or_else(|| {
                    let pos = self.end_position();
                    (self.tokens.last().map(|t| t.span.end).unwrap_or(0), pos)
                });
            Span::new(at.0, at.0, at.1, at.1)
        }
    }

    /// One level deeper; pair with [`TokenStream::exit`].
    pub fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.error_here("Nesting too deep"));
        }
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
