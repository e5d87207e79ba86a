//! brace-style rule (J004): Opening braces share the line of their header,
//! separated by one space, and multi-line control bodies use braces.

use std::ops::ControlFlow;

use crate::declare_rule;
use crate::lexer::TokenKind;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::violation::Violation;
use crate::visitor::{SyntaxVisitor, walk};

declare_rule!(
    BraceStyle,
    id = "J004",
    name = "brace-style",
    description = "Place opening braces on the header line and brace multi-line bodies",
    languages = [JavaScript],
    severity = Warning,
    examples = "// Bad\nfunction test()\n{\n  console.log('test');\n}\n\nif (test)\n  return false;\n\n// Good\nfunction test() {\n  console.log('test');\n}\n\nif (test) return false;\n\nif (test) {\n  return false;\n}"
);

impl Rule for BraceStyle {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let mut visitor = BraceStyleVisitor {
            metadata: &self.metadata,
            file,
            violations: Vec::new(),
        };
        walk(file.root(), &mut visitor);
        visitor.violations
    }
}

/// Statement keyword used in messages about unbraced bodies.
fn statement_keyword(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::IfStatement => "if",
        NodeKind::ForStatement => "for",
        NodeKind::WhileStatement => "while",
        NodeKind::DoWhileStatement => "do",
        _ => "statement",
    }
}

/// Bodies of a control statement, with the keyword that introduces each one.
fn control_bodies(node: &SyntaxNode) -> Vec<(&SyntaxNode, &'static str)> {
    match node.kind {
        NodeKind::IfStatement => {
            let mut bodies = Vec::new();
            if let Some(consequent) = node.children.get(1) {
                bodies.push((consequent, "if"));
            }
            // `else if` chains are checked on the nested statement.
            if let Some(alternate) = node
                .children
                .get(2)
                .filter(|alternate| !alternate.is(NodeKind::IfStatement))
            {
                bodies.push((alternate, "else"));
            }
            bodies
        }
        NodeKind::ForStatement | NodeKind::WhileStatement => node
            .children
            .last()
            .map(|body| vec![(body, statement_keyword(node.kind))])
            .unwrap_or_default(),
        NodeKind::DoWhileStatement => node
            .children
            .first()
            .map(|body| vec![(body, "do")])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

struct BraceStyleVisitor<'a> {
    metadata: &'a RuleMetadata,
    file: &'a ParsedFile,
    violations: Vec<Violation>,
}

impl BraceStyleVisitor<'_> {
    fn check_opening_brace(&mut self, node: &SyntaxNode, parent: Option<&SyntaxNode>) {
        // A free-standing block has no header to share a line with.
        let standalone = parent.is_none_or(|parent| {
            matches!(
                parent.kind,
                NodeKind::Program | NodeKind::Block | NodeKind::SwitchCase | NodeKind::LabeledStatement
            )
        });
        if node.is(NodeKind::Block) && standalone {
            return;
        }

        let brace_index = node.tokens.start;
        let tokens = self.file.tokens();
        let Some(brace) = tokens.get(brace_index).filter(|t| t.is_punct("{")) else {
            return;
        };
        let Some((_, header)) = self.file.previous_significant(brace_index) else {
            return;
        };

        if header.span.end_pos.line != brace.line() {
            self.violations.push(
                self.metadata
                    .violation(
                        self.file,
                        brace.span.start_pos,
                        "Opening brace should be on the same line as its statement",
                    )
                    .with_suggestion(format!("Move '{{' to the end of line {}", header.line())),
            );
            return;
        }

        let single_space = brace_index
            .checked_sub(1)
            .and_then(|i| tokens.get(i))
            .is_some_and(|t| t.kind == TokenKind::Whitespace && t.text == " ");
        if !single_space {
            self.violations.push(
                self.metadata
                    .violation(
                        self.file,
                        brace.span.start_pos,
                        "Expected exactly one space before '{'",
                    )
                    .with_suggestion("Separate '{' from the preceding token with one space"),
            );
        }
    }

    fn check_control_bodies(&mut self, node: &SyntaxNode) {
        for (body, keyword) in control_bodies(node) {
            if matches!(body.kind, NodeKind::Block | NodeKind::EmptyStatement) {
                continue;
            }
            let Some((_, header)) = self.file.previous_significant(body.tokens.start) else {
                continue;
            };
            if body.span.end_pos.line <= header.span.end_pos.line {
                continue;
            }

            let end = body.span.end_pos;
            self.violations.push(
                self.metadata
                    .violation(
                        self.file,
                        body.span.start_pos,
                        format!("Multi-line '{keyword}' body should be wrapped in braces"),
                    )
                    .with_end(end.line, end.column)
                    .with_suggestion("Wrap the body in '{ }' or keep it on one line"),
            );
        }
    }
}

impl SyntaxVisitor for BraceStyleVisitor<'_> {
    fn enter(&mut self, node: &SyntaxNode, ancestors: &[&SyntaxNode]) -> ControlFlow<()> {
        match node.kind {
            NodeKind::Block | NodeKind::ClassBody => {
                self.check_opening_brace(node, ancestors.last().copied());
            }
            kind if kind.is_control_statement() => self.check_control_bodies(node),
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::parse_js;

    fn run_brace_style(code: &str) -> Vec<Violation> {
        BraceStyle::new().check(&parse_js(code))
    }

    #[test]
    fn unbraced_multiline_if_is_reported_once() {
        let violations = run_brace_style("if (test)\n  return false;\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "J004");
        assert_eq!(
            violations[0].message,
            "Multi-line 'if' body should be wrapped in braces"
        );
        assert_eq!((violations[0].line, violations[0].column), (2, 3));
    }

    #[test]
    fn single_line_and_braced_bodies_pass() {
        let code = "if (test) return false;\nif (test) {\n  return false;\n}\nfor (;;) {\n  break;\n}\n";
        assert!(run_brace_style(code).is_empty());
    }

    #[test]
    fn else_and_loop_bodies() {
        let code = "if (a) {\n  b();\n} else\n  c();\nwhile (x)\n  x--;\ndo\n  y++;\nwhile (y < 3);\n";
        let messages: Vec<_> = run_brace_style(code)
            .into_iter()
            .map(|v| v.message)
            .collect();

        assert_eq!(
            messages,
            [
                "Multi-line 'else' body should be wrapped in braces",
                "Multi-line 'while' body should be wrapped in braces",
                "Multi-line 'do' body should be wrapped in braces",
            ]
        );
    }

    #[test]
    fn else_if_chains_are_not_bodies() {
        assert!(run_brace_style("if (a) {\n} else if (b) {\n} else {\n}\n").is_empty());
    }

    #[test]
    fn brace_on_next_line_is_reported() {
        let violations = run_brace_style("function test()\n{\n  return 1;\n}\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Opening brace should be on the same line as its statement"
        );
        assert_eq!((violations[0].line, violations[0].column), (2, 1));
    }

    #[test]
    fn spacing_before_brace() {
        let violations = run_brace_style("function a(){\n}\nclass B  {\n}\nif (c) {\n}\n");

        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.message == "Expected exactly one space before '{'"));
        assert_eq!(violations[0].line, 1);
        assert_eq!(violations[1].line, 3);
    }

    #[test]
    fn standalone_blocks_and_object_literals_are_ignored() {
        let code = "{\n  let a = 1;\n}\nvar o =\n{\n  a: 1\n};\n";
        assert!(run_brace_style(code).is_empty());
    }

    #[test]
    fn arrow_and_method_bodies_are_checked() {
        let code = "var f = () =>{\n};\nclass A {\n  m()\n  {\n  }\n}\n";
        let lines: Vec<_> = run_brace_style(code).iter().map(|v| v.line).collect();
        assert_eq!(lines, [1, 5]);
    }

    #[test]
    fn metadata_is_correct() {
        let rule = BraceStyle::new();
        assert_eq!(rule.metadata().id, "J004");
        assert_eq!(rule.metadata().name, "brace-style");
    }
}
