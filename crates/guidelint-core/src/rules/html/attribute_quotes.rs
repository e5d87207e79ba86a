//! attribute-quotes rule (H002): Wrap attribute values in double quotes

use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::NodeKind;
use crate::violation::Violation;

declare_rule!(
    AttributeQuotes,
    id = "H002",
    name = "attribute-quotes",
    description = "Use double quotes around attribute values",
    languages = [Html],
    severity = Warning,
    examples = "<!-- Bad -->\n<input type=text class='field'>\n\n<!-- Good -->\n<input type=\"text\" class=\"field\">"
);

impl Rule for AttributeQuotes {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let mut violations = Vec::new();

        for attribute in file.root().descendants() {
            if !attribute.is(NodeKind::Attribute) {
                continue;
            }
            let Some(value) = attribute.children.first() else {
                continue;
            };
            let text = value.value().unwrap_or_default();

            let inner = match value.kind {
                NodeKind::Identifier => text,
                NodeKind::StringLiteral if text.starts_with('\'') => text
                    .strip_prefix('\'')
                    .and_then(|rest| rest.strip_suffix('\''))
                    .unwrap_or(text),
                _ => continue,
            };

            let name = attribute.value().unwrap_or_default();
            let end = value.span.end_pos;
            let mut violation = self
                .metadata
                .violation(
                    file,
                    value.span.start_pos,
                    format!("Value of attribute '{name}' should be wrapped in double quotes"),
                )
                .with_end(end.line, end.column);
            if !inner.contains('"') {
                violation = violation.with_suggestion(format!("Use {name}=\"{inner}\""));
            }
            violations.push(violation);
        }

        violations
    }
}
