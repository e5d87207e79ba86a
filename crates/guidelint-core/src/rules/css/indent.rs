//! css-indent rule (C002): Indent stylesheets with a fixed number of spaces

use crate::config::ConfigError;
use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::helpers::{IndentOptions, check_indentation};
use crate::rules::{Rule, RuleMetadata};
use crate::violation::Violation;

declare_rule!(
    CssIndent,
    id = "C002",
    name = "css-indent",
    description = "Indent declarations with spaces, a multiple of the configured width",
    languages = [Css],
    severity = Warning,
    options = IndentOptions,
    examples = "/* Bad */\n.avatar {\n    border-radius: 50%;\n\tborder: 2px solid white;\n}\n\n/* Good */\n.avatar {\n  border-radius: 50%;\n  border: 2px solid white;\n}"
);

impl CssIndent {
    pub fn with_options(options: IndentOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_options(options.validate("css-indent")?))
    }
}

impl Rule for CssIndent {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        check_indentation(&self.metadata, file, self.options.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::parse_css;

    fn run_css_indent(code: &str) -> Vec<Violation> {
        CssIndent::with_options(IndentOptions::default())
            .unwrap()
            .check(&parse_css(code))
    }

    #[test]
    fn nested_rules_with_two_spaces_pass() {
        let code = "@media print {\n  .a {\n    color: red;\n  }\n}\n";
        assert!(run_css_indent(code).is_empty());
    }

    #[test]
    fn odd_and_tab_indentation_are_reported() {
        let code = ".avatar {\n   border-radius: 50%;\n\tborder: 2px solid white;\n}\n";
        let violations = run_css_indent(code);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].rule_id, "C002");
        assert_eq!(violations[0].line, 2);
        assert!(violations[1].message.contains("tab"));
    }

    #[test]
    fn metadata_is_correct() {
        let rule = CssIndent::with_options(IndentOptions::default()).unwrap();
        assert_eq!(rule.metadata().id, "C002");
        assert_eq!(rule.metadata().name, "css-indent");
    }
}
