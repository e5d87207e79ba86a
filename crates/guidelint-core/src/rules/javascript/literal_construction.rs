//! literal-construction rule (J001): Use `{}` and `[]` instead of
//! `new Object()` and `new Array()`
//!
//! `new Array(n)` with a single argument builds an array of length `n` and is
//! left alone.

use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::NodeKind;
use crate::violation::Violation;

declare_rule!(
    LiteralConstruction,
    id = "J001",
    name = "literal-construction",
    description = "Use literal syntax for object and array creation",
    languages = [JavaScript],
    severity = Warning,
    examples = "// Bad\nvar item = new Object();\nvar items = new Array();\n\n// Good\nvar item = {};\nvar items = [];"
);

impl Rule for LiteralConstruction {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        file.root()
            .descendants()
            .filter(|node| node.is(NodeKind::NewExpression))
            .filter_map(|node| {
                let callee = node.children.first()?;
                if !callee.is(NodeKind::Identifier) {
                    return None;
                }
                let argument_count = node
                    .child(NodeKind::Arguments)
                    .map_or(0, |args| args.children.len());

                let (constructor, literal) = match callee.value()? {
                    "Object" => ("Object", "{}"),
                    "Array" if argument_count != 1 => ("Array", "[]"),
                    _ => return None,
                };

                let end = node.span.end_pos;
                Some(
                    self.metadata
                        .violation(
                            file,
                            node.span.start_pos,
                            format!("Use the literal '{literal}' instead of 'new {constructor}()'"),
                        )
                        .with_end(end.line, end.column)
                        .with_suggestion(format!("Replace with '{literal}'")),
                )
            })
            .collect()
    }
}
