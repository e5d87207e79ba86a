//! html-indent rule (H003): Indent markup with a fixed number of spaces
//!
//! Raw `<script>` and `<style>` bodies are single text tokens and are not
//! inspected.

use crate::config::ConfigError;
use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::helpers::{IndentOptions, check_indentation};
use crate::rules::{Rule, RuleMetadata};
use crate::violation::Violation;

declare_rule!(
    HtmlIndent,
    id = "H003",
    name = "html-indent",
    description = "Indent markup with spaces, a multiple of the configured width",
    languages = [Html],
    severity = Warning,
    options = IndentOptions,
    examples = "<!-- Bad -->\n<ul>\n   <li>Fantastic</li>\n</ul>\n\n<!-- Good -->\n<ul>\n  <li>Fantastic</li>\n</ul>"
);

impl HtmlIndent {
    pub fn with_options(options: IndentOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_options(options.validate("html-indent")?))
    }
}

impl Rule for HtmlIndent {
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
    use crate::parser::test_support::parse_html;

    fn run_html_indent(code: &str) -> Vec<Violation> {
        HtmlIndent::with_options(IndentOptions::default())
            .unwrap()
            .check(&parse_html(code))
    }

    #[test]
    fn nested_markup_passes() {
        let code = "<ul>\n  <li>Fantastic</li>\n  <li>Great</li>\n</ul>\n";
        assert!(run_html_indent(code).is_empty());
    }

    #[test]
    fn odd_indentation_is_reported() {
        let violations = run_html_indent("<ul>\n   <li>Fantastic</li>\n</ul>\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "H003");
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn script_bodies_are_skipped() {
        let code = "<script>\n   var a = 1;\n\tvar b = 2;\n</script>\n";
        assert!(run_html_indent(code).is_empty());
    }

    #[test]
    fn metadata_is_correct() {
        let rule = HtmlIndent::with_options(IndentOptions::default()).unwrap();
        assert_eq!(rule.metadata().id, "H003");
        assert_eq!(rule.metadata().name, "html-indent");
    }
}
