//! comma-style rule (J007): Commas end a line, they never start one

use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::violation::Violation;

declare_rule!(
    CommaStyle,
    id = "J007",
    name = "comma-style",
    description = "Disallow leading commas",
    languages = [JavaScript],
    severity = Warning,
    examples = "// Bad\nvar hero = {\n    firstName: 'Bob'\n  , lastName: 'Parr'\n};\n\n// Good\nvar hero = {\n  firstName: 'Bob',\n  lastName: 'Parr'\n};"
);

impl Rule for CommaStyle {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        file.tokens()
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_punct(","))
            .filter(|(index, token)| {
                file.previous_significant(*index)
                    .is_some_and(|(_, prev)| prev.span.end_pos.line < token.line())
            })
            .map(|(_, token)| {
                self.metadata
                    .violation(file, token.span.start_pos, "Comma should be placed at the end of the line")
                    .with_suggestion("Move the comma to the end of the previous line")
            })
            .collect()
    }
}
