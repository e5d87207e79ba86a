//! quote-style rule (J002): Enforce one quote character for string literals
//!
//! Template literals are exempt. With `avoid-escape`, a string may use the
//! other quote when its body contains the preferred one.

use serde::Deserialize;

use crate::declare_rule;
use crate::lexer::TokenKind;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::violation::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    fn char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }

    fn name(self) -> &'static str {
        match self {
            Quote::Single => "single",
            Quote::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct QuoteStyleOptions {
    pub preferred: Quote,
    pub avoid_escape: bool,
}

impl Default for QuoteStyleOptions {
    fn default() -> Self {
        Self {
            preferred: Quote::Single,
            avoid_escape: true,
        }
    }
}

declare_rule!(
    QuoteStyle,
    id = "J002",
    name = "quote-style",
    description = "Use a consistent quote character for strings",
    languages = [JavaScript],
    severity = Warning,
    options = QuoteStyleOptions,
    examples = "// Bad\nvar name = \"Bob Parr\";\n\n// Good\nvar name = 'Bob Parr';\nvar quote = \"It's fine to avoid escapes\";"
);

impl QuoteStyle {
    pub fn new() -> Self {
        Self::from_options(QuoteStyleOptions::default())
    }

    pub fn with_options(options: QuoteStyleOptions) -> Self {
        Self::from_options(options)
    }
}

impl Default for QuoteStyle {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a string body delimited by `from` so it can be delimited by `to`.
fn requote(body: &str, from: char, to: char) -> String {
    let mut out = String::with_capacity(body.len() + 2);
    out.push(to);
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next == from => out.push(from),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else if c == to {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out.push(to);
    out
}

impl Rule for QuoteStyle {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let preferred = self.options.preferred.char();
        let mut violations = Vec::new();

        for token in file.tokens().iter().filter(|t| t.kind == TokenKind::String) {
            let Some(quote) = token.text.chars().next() else {
                continue;
            };
            if quote == '`' || quote == preferred {
                continue;
            }
            let body = token
                .text
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
                .unwrap_or("");
            if self.options.avoid_escape && body.contains(preferred) {
                continue;
            }

            let end = token.span.end_pos;
            violations.push(
                self.metadata
                    .violation(
                        file,
                        token.span.start_pos,
                        format!("Strings must use {} quotes", self.options.preferred.name()),
                    )
                    .with_end(end.line, end.column)
                    .with_suggestion(format!("Replace with {}", requote(body, quote, preferred))),
            );
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::parse_js;

    fn run_quote_style(code: &str) -> Vec<Violation> {
        QuoteStyle::new().check(&parse_js(code))
    }

    fn run_with(options: QuoteStyleOptions, code: &str) -> Vec<Violation> {
        QuoteStyle::with_options(options).check(&parse_js(code))
    }

    #[test]
    fn detects_double_quotes_by_default() {
        let violations = run_quote_style("var name = \"Bob Parr\";\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "J002");
        assert_eq!(violations[0].message, "Strings must use single quotes");
        assert_eq!(violations[0].column, 12);
        assert_eq!(
            violations[0].suggestion.as_deref(),
            Some("Replace with 'Bob Parr'")
        );
    }

    #[test]
    fn accepts_preferred_quotes_and_templates() {
        assert!(run_quote_style("var a = 'x';\nvar b = `y ${a} \"z\"`;\n").is_empty());
    }

    #[test]
    fn avoid_escape_allows_the_other_quote() {
        assert!(run_quote_style("var s = \"It's\";\n").is_empty());

        let strict = QuoteStyleOptions {
            avoid_escape: false,
            ..Default::default()
        };
        let violations = run_with(strict, "var s = \"It's\";\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].suggestion.as_deref(),
            Some("Replace with 'It\\'s'")
        );
    }

    #[test]
    fn double_preference() {
        let options = QuoteStyleOptions {
            preferred: Quote::Double,
            ..Default::default()
        };
        let violations = run_with(options, "import a from 'a';\nvar b = \"ok\";\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 1);
        assert_eq!(violations[0].message, "Strings must use double quotes");
    }

    #[test]
    fn escaped_quotes_are_unescaped_in_suggestion() {
        assert_eq!(requote("say \\\"hi\\\"", '"', '\''), "'say \"hi\"'");
    }

    #[test]
    fn options_deserialize_from_kebab_case() {
        let table: toml::Table = "preferred = \"double\"\navoid-escape = false".parse().unwrap();
        let options: QuoteStyleOptions = toml::Value::Table(table).try_into().unwrap();

        assert_eq!(options.preferred, Quote::Double);
        assert!(!options.avoid_escape);
    }

    #[test]
    fn metadata_is_correct() {
        let rule = QuoteStyle::new();
        assert_eq!(rule.metadata().id, "J002");
        assert_eq!(rule.metadata().name, "quote-style");
    }
}
