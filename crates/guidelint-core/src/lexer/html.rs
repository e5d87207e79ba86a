//! HTML tokenizer.
//!
//! Runs in two modes: character data between tags, and the inside of a tag.
//! The bodies of `<script>` and `<style>` are emitted as a single raw `Text`
//! token.

use super::{Cursor, LexError, Token, TokenKind};

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(super) fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor::new(source);

    while !cursor.is_eof() {
        if cursor.lex_layout() {
            continue;
        }

        cursor.begin();
        if cursor.starts_with("<!--") {
            lex_comment(&mut cursor)?;
            cursor.emit(TokenKind::Comment);
        } else if cursor.starts_with("<!") || cursor.starts_with("<?") {
            lex_directive(&mut cursor)?;
            cursor.emit(TokenKind::Directive);
        } else if cursor.starts_with("</") && cursor.peek_nth(2).is_some_and(is_tag_start) {
            cursor.bump_n(2);
            cursor.emit(TokenKind::Punctuation);
            lex_tag(&mut cursor)?;
        } else if cursor.starts_with("<") && cursor.peek_nth(1).is_some_and(is_tag_start) {
            cursor.bump();
            cursor.emit(TokenKind::Punctuation);
            let name = lex_tag(&mut cursor)?;
            if let Some(name) = name {
                let lowered = name.to_ascii_lowercase();
                if RAW_TEXT_ELEMENTS.contains(&lowered.as_str()) && last_closed_open_tag(&cursor)
                {
                    lex_raw_text(&mut cursor, &lowered);
                }
            }
        } else {
            lex_text(&mut cursor);
            cursor.emit(TokenKind::Text);
        }
    }

    Ok(cursor.finish())
}

fn is_tag_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn lex_comment(cursor: &mut Cursor) -> Result<(), LexError> {
    let start = cursor.token_start_pos();
    cursor.bump_n(4);
    loop {
        if cursor.eat("-->") {
            return Ok(());
        }
        if cursor.bump().is_none() {
            return Err(LexError::new("Unterminated comment", start));
        }
    }
}

fn lex_directive(cursor: &mut Cursor) -> Result<(), LexError> {
    let start = cursor.token_start_pos();
    loop {
        match cursor.bump() {
            Some('>') => return Ok(()),
            Some(_) => {}
            None => return Err(LexError::new("Unterminated markup declaration", start)),
        }
    }
}

fn lex_text(cursor: &mut Cursor) {
    // The first character is always taken so a lone `<` cannot stall the loop.
    cursor.bump();
    while let Some(c) = cursor.peek() {
        if c == '<' || c.is_whitespace() {
            break;
        }
        cursor.bump();
    }
}

/// Tokenize a tag after its `<` or `</`; returns the tag name.
fn lex_tag(cursor: &mut Cursor) -> Result<Option<String>, LexError> {
    cursor.begin();
    let name_start = cursor.offset();
    cursor.eat_while(|c| !c.is_whitespace() && c != '>' && c != '/');
    let name = cursor.source()[name_start..cursor.offset()].to_string();
    cursor.emit(TokenKind::Identifier);

    loop {
        if cursor.lex_layout() {
            continue;
        }
        cursor.begin();
        match cursor.peek() {
            None => break,
            Some('>') => {
                cursor.bump();
                cursor.emit(TokenKind::Punctuation);
                break;
            }
            Some('/') if cursor.peek_nth(1) == Some('>') => {
                cursor.bump_n(2);
                cursor.emit(TokenKind::Punctuation);
                break;
            }
            Some('=') => {
                cursor.bump();
                cursor.emit(TokenKind::Punctuation);
            }
            Some(quote @ ('"' | '\'')) => {
                let start = cursor.token_start_pos();
                cursor.bump();
                loop {
                    match cursor.bump() {
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => return Err(LexError::new("Unterminated attribute value", start)),
                    }
                }
                cursor.emit(TokenKind::String);
            }
            Some(_) => {
                cursor.bump();
                while let Some(c) = cursor.peek() {
                    if c.is_whitespace()
                        || c == '>'
                        || c == '='
                        || c == '"'
                        || c == '\''
                        || cursor.starts_with("/>")
                    {
                        break;
                    }
                    cursor.bump();
                }
                cursor.emit(TokenKind::Identifier);
            }
        }
    }

    Ok(if name.is_empty() { None } else { Some(name) })
}

/// True when the tag just lexed was closed by `>` (not `/>`, not EOF).
fn last_closed_open_tag(cursor: &Cursor) -> bool {
    cursor.last_token().is_some_and(|t| t.is_punct(">"))
}

fn lex_raw_text(cursor: &mut Cursor, name: &str) {
    let closing = format!("</{name}");
    cursor.begin();
    while !cursor.is_eof() && !cursor.starts_with_ignore_case(&closing) {
        cursor.bump();
    }
    cursor.emit(TokenKind::Text);
}
