//! JavaScript tokenizer.

use super::{Cursor, LexError, Token, TokenKind};

const PUNCTUATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "...", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**",
];

/// Keywords after which a `/` starts a regular expression rather than a division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Keywords whose parenthesized head is followed by a statement, so a `/`
/// after the closing paren starts a regular expression.
const PAREN_HEAD_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

pub(super) fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor::new(source);
    // One entry per open `(`: whether it starts a statement head.
    let mut parens: Vec<bool> = Vec::new();
    let mut closed_statement_head = false;

    if cursor.starts_with("#!") {
        cursor.begin();
        eat_line(&mut cursor);
        cursor.emit(TokenKind::Comment);
    }

    while !cursor.is_eof() {
        if cursor.lex_layout() {
            continue;
        }

        cursor.begin();
        let Some(c) = cursor.peek() else {
            break;
        };
        let next = cursor.peek_nth(1);

        match c {
            '\u{feff}' => {
                cursor.bump();
                cursor.emit(TokenKind::Whitespace);
            }
            '/' if next == Some('/') => {
                eat_line(&mut cursor);
                cursor.emit(TokenKind::Comment);
            }
            '/' if next == Some('*') => {
                lex_block_comment(&mut cursor)?;
                cursor.emit(TokenKind::Comment);
            }
            '/' if regex_allowed(&cursor, closed_statement_head) => {
                lex_regex(&mut cursor)?;
                cursor.emit(TokenKind::Regex);
            }
            '\'' | '"' => {
                lex_string(&mut cursor, c)?;
                cursor.emit(TokenKind::String);
            }
            '`' => {
                lex_template(&mut cursor)?;
                cursor.emit(TokenKind::String);
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                lex_number(&mut cursor);
                cursor.emit(TokenKind::Number);
            }
            c if c.is_ascii_digit() => {
                lex_number(&mut cursor);
                cursor.emit(TokenKind::Number);
            }
            '#' if next.is_some_and(is_ident_start) => {
                cursor.bump();
                cursor.eat_while(is_ident_continue);
                cursor.emit(TokenKind::Identifier);
            }
            c if is_ident_start(c) => {
                cursor.eat_while(is_ident_continue);
                cursor.emit(TokenKind::Identifier);
            }
            '(' => {
                let head = cursor
                    .last_significant()
                    .is_some_and(|t| PAREN_HEAD_KEYWORDS.contains(&t.text.as_str()));
                parens.push(head);
                cursor.bump();
                cursor.emit(TokenKind::Punctuation);
            }
            ')' => {
                closed_statement_head = parens.pop().unwrap_or(false);
                cursor.bump();
                cursor.emit(TokenKind::Punctuation);
            }
            _ => {
                lex_punctuator(&mut cursor);
                cursor.emit(TokenKind::Punctuation);
            }
        }
    }

    Ok(cursor.finish())
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

fn eat_line(cursor: &mut Cursor) {
    while !cursor.is_eof() && !cursor.at_newline() {
        cursor.bump();
    }
}

pub(super) fn lex_block_comment(cursor: &mut Cursor) -> Result<(), LexError> {
    let start = cursor.token_start_pos();
    cursor.bump_n(2);
    loop {
        if cursor.eat("*/") {
            return Ok(());
        }
        if cursor.bump().is_none() {
            return Err(LexError::new("Unterminated block comment", start));
        }
    }
}

pub(super) fn lex_string(cursor: &mut Cursor, quote: char) -> Result<(), LexError> {
    let start = cursor.token_start_pos();
    cursor.bump();
    loop {
        match cursor.peek() {
            None => return Err(LexError::new("Unterminated string literal", start)),
            Some('\\') => {
                cursor.bump();
                if cursor.starts_with("\r\n") {
                    cursor.bump();
                }
                cursor.bump();
            }
            Some(c) if c == quote => {
                cursor.bump();
                return Ok(());
            }
            Some('\n') | Some('\r') => {
                return Err(LexError::new("Unterminated string literal", start));
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

fn lex_template(cursor: &mut Cursor) -> Result<(), LexError> {
    let start = cursor.token_start_pos();
    cursor.bump();
    if skip_template_body(cursor) {
        Ok(())
    } else {
        Err(LexError::new("Unterminated template literal", start))
    }
}

/// Consume a template body up to and including the closing backtick.
fn skip_template_body(cursor: &mut Cursor) -> bool {
    loop {
        match cursor.peek() {
            None => return false,
            Some('\\') => cursor.bump_n(2),
            Some('`') => {
                cursor.bump();
                return true;
            }
            Some('$') if cursor.peek_nth(1) == Some('{') => {
                cursor.bump_n(2);
                if !skip_substitution(cursor) {
                    return false;
                }
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

/// Consume a `${ ... }` substitution up to and including its closing brace.
fn skip_substitution(cursor: &mut Cursor) -> bool {
    let mut depth = 0usize;
    loop {
        match cursor.peek() {
            None => return false,
            Some('{') => {
                depth += 1;
                cursor.bump();
            }
            Some('}') => {
                cursor.bump();
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Some('`') => {
                cursor.bump();
                if !skip_template_body(cursor) {
                    return false;
                }
            }
            Some(quote @ ('\'' | '"')) => {
                cursor.bump();
                loop {
                    match cursor.bump() {
                        None => return false,
                        Some('\\') => {
                            cursor.bump();
                        }
                        Some(c) if c == quote => break,
                        Some(_) => {}
                    }
                }
            }
            Some('/') if cursor.peek_nth(1) == Some('*') => {
                cursor.bump_n(2);
                while !cursor.eat("*/") {
                    if cursor.bump().is_none() {
                        return false;
                    }
                }
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

/// `closed_statement_head` tells whether the most recent `)` ended the head
/// of an `if`, `while`, `for` or `with`.
fn regex_allowed(cursor: &Cursor, closed_statement_head: bool) -> bool {
    match cursor.last_significant() {
        None => true,
        Some(token) => match token.kind {
            TokenKind::Punctuation if token.text == ")" => closed_statement_head,
            TokenKind::Punctuation => token.text != "]",
            TokenKind::Identifier => REGEX_PRECEDING_KEYWORDS.contains(&token.text.as_str()),
            _ => false,
        },
    }
}

fn lex_regex(cursor: &mut Cursor) -> Result<(), LexError> {
    let start = cursor.token_start_pos();
    cursor.bump();
    let mut in_class = false;
    loop {
        match cursor.peek() {
            None | Some('\n') | Some('\r') => {
                return Err(LexError::new("Unterminated regular expression", start));
            }
            Some('\\') => {
                cursor.bump();
                if cursor.at_newline() || cursor.is_eof() {
                    return Err(LexError::new("Unterminated regular expression", start));
                }
                cursor.bump();
            }
            Some('[') => {
                in_class = true;
                cursor.bump();
            }
            Some(']') => {
                in_class = false;
                cursor.bump();
            }
            Some('/') if !in_class => {
                cursor.bump();
                cursor.eat_while(is_ident_continue);
                return Ok(());
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

fn lex_number(cursor: &mut Cursor) {
    let radix_prefix = cursor.peek() == Some('0')
        && matches!(
            cursor.peek_nth(1),
            Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
        );
    if radix_prefix {
        cursor.bump_n(2);
        cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        cursor.eat("n");
        return;
    }

    cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
    if cursor.peek() == Some('.') {
        cursor.bump();
        cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
    }
    if matches!(cursor.peek(), Some('e' | 'E')) {
        let sign = matches!(cursor.peek_nth(1), Some('+' | '-'));
        let digit_at = if sign { 2 } else { 1 };
        if cursor
            .peek_nth(digit_at)
            .is_some_and(|c| c.is_ascii_digit())
        {
            cursor.bump_n(digit_at);
            cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
    }
    cursor.eat("n");
}

fn lex_punctuator(cursor: &mut Cursor) {
    for punct in PUNCTUATORS {
        if cursor.starts_with(punct) {
            // `a ?.5 : b` is a conditional followed by a number
            if *punct == "?." && cursor.peek_nth(2).is_some_and(|c| c.is_ascii_digit()) {
                break;
            }
            cursor.bump_n(punct.len());
            return;
        }
    }
    cursor.bump();
}
