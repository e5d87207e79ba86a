//! Checks shared by rules of several languages.

use serde::Deserialize;

use crate::config::ConfigError;
use crate::lexer::TokenKind;
use crate::parser::ParsedFile;
use crate::rules::RuleMetadata;
use crate::violation::Violation;

pub const DEFAULT_INDENT_WIDTH: usize = 2;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IndentOptions {
    /// Spaces per indentation level.
    pub width: usize,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl IndentOptions {
    pub fn validate(self, rule_name: &str) -> Result<Self, ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::invalid_option(
                rule_name,
                "width must be at least 1",
            ));
        }
        Ok(self)
    }
}

/// Leading whitespace that contains a tab or is not a multiple of `width`.
///
/// Only whitespace tokens starting a line count, so indentation inside
/// comments, strings and raw `<script>` bodies is never inspected. Lines
/// holding nothing but whitespace are skipped.
pub fn check_indentation(
    metadata: &RuleMetadata,
    file: &ParsedFile,
    width: usize,
) -> Vec<Violation> {
    let tokens = file.tokens();
    let mut violations = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Whitespace || token.column() != 1 {
            continue;
        }
        let blank = tokens
            .get(index + 1)
            .is_none_or(|next| next.kind == TokenKind::Newline);
        if blank {
            continue;
        }

        let columns = token.text.chars().count();
        let message = if token.text.contains('\t') {
            format!("Indentation contains a tab; indent with {width} spaces per level")
        } else if columns % width != 0 {
            format!("Indentation of {columns} spaces is not a multiple of {width}")
        } else {
            continue;
        };

        violations.push(
            metadata
                .violation(file, token.span.start_pos, message)
                .with_end(token.span.end_pos.line, token.span.end_pos.column),
        );
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::parser::test_support::parse_js;
    use crate::violation::Severity;

    fn metadata() -> RuleMetadata {
        RuleMetadata {
            id: "T001",
            name: "test-indent",
            description: "test",
            languages: &[Language::JavaScript],
            severity: Severity::Warning,
            examples: None,
        }
    }

    fn lines(source: &str, width: usize) -> Vec<usize> {
        check_indentation(&metadata(), &parse_js(source), width)
            .iter()
            .map(|v| v.line)
            .collect()
    }

    #[test]
    fn multiples_of_width_pass() {
        assert!(lines("if (a) {\n  b();\n    c();\n}\n", 2).is_empty());
    }

    #[test]
    fn odd_indentation_is_reported() {
        assert_eq!(lines("if (a) {\n   b();\n  c();\n}\n", 2), [2]);
        assert_eq!(lines("if (a) {\n  b();\n}\n", 4), [2]);
    }

    #[test]
    fn tabs_are_reported() {
        let violations = check_indentation(&metadata(), &parse_js("if (a) {\n\tb();\n}\n"), 2);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("tab"));
        assert_eq!((violations[0].column, violations[0].end_column), (1, 2));
    }

    #[test]
    fn blank_lines_and_comment_bodies_are_skipped() {
        let source = "/*\n   * odd inside a comment\n   */\nvar a = 1;\n   \nvar b = `\n   x`;\n";
        assert!(lines(source, 2).is_empty());
    }

    #[test]
    fn width_counts_characters_not_bytes() {
        // U+3000 is one column but three bytes.
        let source = "if (a) {\n\u{3000}b();\n}\n";
        let violations = check_indentation(&metadata(), &parse_js(source), 3);

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Indentation of 1 spaces is not a multiple of 3"
        );
    }

    #[test]
    fn zero_width_is_invalid() {
        let err = IndentOptions { width: 0 }.validate("indent").unwrap_err();
        assert!(err.to_string().contains("width must be at least 1"));
        assert!(IndentOptions::default().validate("indent").is_ok());
    }
}
