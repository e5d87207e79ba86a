//! trailing-newline rule (F001): Files end with exactly one newline

use crate::declare_rule;
use crate::lexer::Position;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::violation::Violation;

declare_rule!(
    TrailingNewline,
    id = "F001",
    name = "trailing-newline",
    description = "End files with a single newline character",
    languages = [JavaScript, Css, Html],
    severity = Warning,
    examples = "// Bad\nimport { es6 } from './AirbnbStyleGuide';\nexport default es6;\u{21b5}\n\u{21b5}\n\n// Good\nimport { es6 } from './AirbnbStyleGuide';\nexport default es6;\u{21b5}"
);

fn strip_newline(text: &str) -> Option<&str> {
    text.strip_suffix("\r\n").or_else(|| text.strip_suffix('\n'))
}

impl Rule for TrailingNewline {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let source = file.source();
        if source.is_empty() {
            return Vec::new();
        }

        let Some(content) = strip_newline(source) else {
            let line = source.matches('\n').count() + 1;
            let last_line = source.rsplit('\n').next().unwrap_or(source);
            let at = Position::new(line, last_line.chars().count() + 1);
            return vec![
                self.metadata
                    .violation(file, at, "File should end with a newline")
                    .with_suggestion("Add a newline at the end of the file"),
            ];
        };

        if strip_newline(content).is_none() {
            return Vec::new();
        }

        // First of the surplus blank lines.
        let body = content.trim_end_matches(['\n', '\r']);
        let line = body.matches('\n').count() + 2;
        let extra = source.matches('\n').count() - (line - 1);
        vec![
            self.metadata
                .violation(
                    file,
                    Position::new(line, 1),
                    "File should end with exactly one newline",
                )
                .with_end(line + extra - 1, 1)
                .with_suggestion("Remove the blank lines at the end of the file"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::{parse_css, parse_html, parse_js};

    fn run_trailing_newline(code: &str) -> Vec<Violation> {
        TrailingNewline::new().check(&parse_js(code))
    }

    #[test]
    fn exactly_one_newline_passes() {
        assert!(run_trailing_newline("var a = 1;\n").is_empty());
        assert!(run_trailing_newline("var a = 1;\r\n").is_empty());
    }

    #[test]
    fn empty_file_passes() {
        assert!(run_trailing_newline("").is_empty());
    }

    #[test]
    fn missing_newline_is_reported_at_end_of_last_line() {
        let violations = run_trailing_newline("var a = 1;\nvar b = 2;");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "F001");
        assert_eq!(violations[0].message, "File should end with a newline");
        assert_eq!((violations[0].line, violations[0].column), (2, 11));
    }

    #[test]
    fn extra_blank_lines_are_reported_once() {
        let violations = run_trailing_newline("var a = 1;\n\n\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "File should end with exactly one newline"
        );
        assert_eq!((violations[0].line, violations[0].column), (2, 1));
        assert_eq!(violations[0].end_line, 3);
    }

    #[test]
    fn applies_to_css_and_html() {
        let rule = TrailingNewline::new();
        assert_eq!(rule.check(&parse_css("a { color: red; }")).len(), 1);
        assert_eq!(rule.check(&parse_html("<p>x</p>\n\n")).len(), 1);
        assert!(rule.check(&parse_html("<p>x</p>\n")).is_empty());
    }

    #[test]
    fn metadata_is_correct() {
        let rule = TrailingNewline::new();
        assert_eq!(rule.metadata().id, "F001");
        assert_eq!(rule.metadata().languages.len(), 3);
    }
}
