//! eqeqeq rule (J003): Require === and !== instead of == and !=
//!
//! With `allow-null`, `== null` and `!= null` are accepted since they check for
//! both null and undefined.

use serde::Deserialize;

use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::violation::Violation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EqeqeqOptions {
    pub allow_null: bool,
}

declare_rule!(
    Eqeqeq,
    id = "J003",
    name = "eqeqeq",
    description = "Require === and !== instead of == and !=",
    languages = [JavaScript],
    severity = Warning,
    options = EqeqeqOptions,
    examples = "// Bad\nif (x == y) { }\nif (x != y) { }\n\n// Good\nif (x === y) { }\nif (x !== y) { }"
);

impl Eqeqeq {
    pub fn new() -> Self {
        Self::from_options(EqeqeqOptions::default())
    }

    pub fn with_options(options: EqeqeqOptions) -> Self {
        Self::from_options(options)
    }

    fn is_null_comparison(node: &SyntaxNode) -> bool {
        node.children
            .iter()
            .any(|operand| operand.is(NodeKind::Literal) && operand.value() == Some("null"))
    }
}

impl Default for Eqeqeq {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Eqeqeq {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let mut violations = Vec::new();

        for node in file.root().descendants() {
            if !node.is(NodeKind::BinaryExpression) {
                continue;
            }
            let strict = match node.value() {
                Some("==") => "===",
                Some("!=") => "!==",
                _ => continue,
            };
            if self.options.allow_null && Self::is_null_comparison(node) {
                continue;
            }
            let Some(left) = node.children.first() else {
                continue;
            };
            let Some((_, operator)) = file.next_significant(left.tokens.end) else {
                continue;
            };

            let loose = &operator.text;
            let end = operator.span.end_pos;
            violations.push(
                self.metadata
                    .violation(
                        file,
                        operator.span.start_pos,
                        format!("Expected '{strict}' but found '{loose}'"),
                    )
                    .with_end(end.line, end.column)
                    .with_suggestion(format!("Replace '{loose}' with '{strict}'")),
            );
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parser::test_support::parse_js;

    fn run_eqeqeq(code: &str) -> Vec<Violation> {
        Eqeqeq::new().check(&parse_js(code))
    }

    #[test]
    fn detects_double_equals() {
        let violations = run_eqeqeq("if (x == y) {}");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "J003");
        assert_eq!(violations[0].message, "Expected '===' but found '=='");
        assert_eq!((violations[0].column, violations[0].end_column), (7, 9));
        assert!(violations[0].suggestion.is_some());
    }

    #[test]
    fn detects_not_equals() {
        let violations = run_eqeqeq("if (x != y) {}");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "Expected '!==' but found '!='");
    }

    #[test]
    fn ignores_strict_operators() {
        assert!(run_eqeqeq("if (x === y && a !== b) {}").is_empty());
    }

    #[test]
    fn locates_operator_after_parenthesized_operand() {
        let violations = run_eqeqeq("var ok = (a + b)\n  == c;\n");

        assert_eq!(violations.len(), 1);
        assert_eq!((violations[0].line, violations[0].column), (2, 3));
    }

    #[test]
    fn null_comparison_needs_allow_null() {
        assert_eq!(run_eqeqeq("if (x == null) {}").len(), 1);

        let rule = Eqeqeq::with_options(EqeqeqOptions { allow_null: true });
        assert!(rule.check(&parse_js("if (x == null) {}")).is_empty());
        assert_eq!(rule.check(&parse_js("if (x == 0) {}")).len(), 1);
    }

    #[test]
    fn nested_comparisons_each_reported() {
        let violations = run_eqeqeq("var t = (a == b) != (c == d);\n");
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn metadata_is_correct() {
        let rule = Eqeqeq::new();
        assert_eq!(rule.metadata().id, "J003");
        assert_eq!(rule.metadata().name, "eqeqeq");
    }
}
