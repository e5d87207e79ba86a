//! CSS tokenizer.

use super::javascript::{lex_block_comment, lex_string};
use super::{Cursor, LexError, Token, TokenKind};

pub(super) fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor::new(source);

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
            '/' if next == Some('*') => {
                lex_block_comment(&mut cursor)?;
                cursor.emit(TokenKind::Comment);
            }
            '"' | '\'' => {
                lex_string(&mut cursor, c)?;
                cursor.emit(TokenKind::String);
            }
            c if c.is_ascii_digit() => {
                lex_number(&mut cursor);
                cursor.emit(TokenKind::Number);
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                lex_number(&mut cursor);
                cursor.emit(TokenKind::Number);
            }
            '-' | '+' if starts_signed_number(&cursor) => {
                cursor.bump();
                lex_number(&mut cursor);
                cursor.emit(TokenKind::Number);
            }
            '@' | '#' if next.is_some_and(is_name_char) => {
                cursor.bump();
                cursor.eat_while(is_name_char);
                cursor.emit(TokenKind::Identifier);
            }
            '-' if next.is_some_and(|n| is_name_start(n) || n == '-') => {
                cursor.eat_while(is_name_char);
                cursor.emit(TokenKind::Identifier);
            }
            c if is_name_start(c) => {
                cursor.eat_while(is_name_char);
                cursor.emit(TokenKind::Identifier);
            }
            '\\' => {
                cursor.bump_n(2);
                cursor.eat_while(is_name_char);
                cursor.emit(TokenKind::Identifier);
            }
            _ => {
                cursor.bump();
                cursor.emit(TokenKind::Punctuation);
            }
        }
    }

    Ok(cursor.finish())
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || (!c.is_ascii() && !c.is_whitespace())
}

/// A sign starts a number when it is followed by digits and does not sit
/// directly after an operand, e.g. `margin: 0 -1em`.
fn starts_signed_number(cursor: &Cursor) -> bool {
    let digit_follows = match cursor.peek_nth(1) {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => cursor.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    };
    if !digit_follows {
        return false;
    }
    let before = &cursor.source()[..cursor.offset()];
    match before.chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | ':' | ',' | '/'),
    }
}

fn lex_number(cursor: &mut Cursor) {
    cursor.eat_while(|c| c.is_ascii_digit());
    if cursor.peek() == Some('.') && cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
        cursor.bump();
        cursor.eat_while(|c| c.is_ascii_digit());
    }
    if !cursor.eat("%") {
        cursor.eat_while(|c| c.is_ascii_alphabetic());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn tokenizes_ruleset() {
        let tokens = significant(".nav a:hover { color: #FFF; }");
        let texts: Vec<_> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            [".", "nav", "a", ":", "hover", "{", "color", ":", "#FFF", ";", "}"]
        );
        assert_eq!(tokens[8].0, TokenKind::Identifier);
    }

    #[test]
    fn numbers_keep_units() {
        let tokens = significant("margin: 0 -1.5em 10px 50%;");
        let numbers: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Number)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(numbers, ["0", "-1.5em", "10px", "50%"]);
    }

    #[test]
    fn custom_properties_and_vendor_prefixes() {
        let tokens = significant("--main-color: red; -webkit-box-sizing: border-box;");
        assert_eq!(tokens[0], (TokenKind::Identifier, "--main-color".to_string()));
        assert_eq!(
            tokens[4],
            (TokenKind::Identifier, "-webkit-box-sizing".to_string())
        );
    }

    #[test]
    fn at_keywords_are_identifiers() {
        let tokens = significant("@media screen { }");
        assert_eq!(tokens[0], (TokenKind::Identifier, "@media".to_string()));
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let err = tokenize("a { }\n/* open").unwrap_err();
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("a { content: \"x; }\n").is_err());
    }
}
