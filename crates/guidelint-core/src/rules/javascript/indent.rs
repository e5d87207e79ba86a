//! indent rule (J008): Indent with a fixed number of spaces per level

use crate::config::ConfigError;
use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::helpers::{IndentOptions, check_indentation};
use crate::rules::{Rule, RuleMetadata};
use crate::violation::Violation;

declare_rule!(
    Indent,
    id = "J008",
    name = "indent",
    description = "Indent with spaces, a multiple of the configured width",
    languages = [JavaScript],
    severity = Warning,
    options = IndentOptions,
    examples = "// Bad\nfunction foo() {\n\u{2219}\u{2219}\u{2219}\u{2219}let name;\n}\n\n// Good\nfunction foo() {\n\u{2219}\u{2219}let name;\n}"
);

impl Indent {
    pub fn with_options(options: IndentOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_options(options.validate("indent")?))
    }
}

impl Rule for Indent {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        check_indentation(&self.metadata, file, self.options.width)
    }
}
