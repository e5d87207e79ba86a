//! semi rule (J006): Terminate statements with a semicolon instead of relying
//! on automatic semicolon insertion

use std::ops::ControlFlow;

use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::violation::Violation;
use crate::visitor::{SyntaxVisitor, walk};

declare_rule!(
    Semi,
    id = "J006",
    name = "semi",
    description = "Require semicolons at the end of statements",
    languages = [JavaScript],
    severity = Warning,
    examples = "// Bad\nvar name = 'Skywalker'\nreturn name\n\n// Good\nvar name = 'Skywalker';\nreturn name;"
);

impl Rule for Semi {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let mut visitor = SemiVisitor {
            metadata: &self.metadata,
            file,
            violations: Vec::new(),
        };
        walk(file.root(), &mut visitor);
        visitor.violations
    }
}

/// Whether `node` is a statement that ends with its own semicolon.
fn needs_semicolon(node: &SyntaxNode, parent: Option<&SyntaxNode>) -> bool {
    match node.kind {
        NodeKind::ExpressionStatement
        | NodeKind::ReturnStatement
        | NodeKind::ThrowStatement
        | NodeKind::BreakStatement
        | NodeKind::ContinueStatement
        | NodeKind::DebuggerStatement
        | NodeKind::ImportDeclaration
        | NodeKind::PropertyDefinition => true,
        // `for (var i = 0; ...)` declarations end at the header's own `;`.
        NodeKind::VariableDeclaration => {
            !parent.is_some_and(|parent| parent.is(NodeKind::ForStatement))
        }
        // `export { a }`, `export * from 'x'` and `export default expr`; exported
        // declarations are checked on their own.
        NodeKind::ExportDeclaration => match node.children.first() {
            None => true,
            Some(child) => !matches!(
                child.kind,
                NodeKind::FunctionDeclaration
                    | NodeKind::ClassDeclaration
                    | NodeKind::VariableDeclaration
                    | NodeKind::ExpressionStatement
                    | NodeKind::Block
                    | NodeKind::EmptyStatement
            ),
        },
        _ => false,
    }
}

struct SemiVisitor<'a> {
    metadata: &'a RuleMetadata,
    file: &'a ParsedFile,
    violations: Vec<Violation>,
}

impl SyntaxVisitor for SemiVisitor<'_> {
    fn enter(&mut self, node: &SyntaxNode, ancestors: &[&SyntaxNode]) -> ControlFlow<()> {
        if !needs_semicolon(node, ancestors.last().copied()) {
            return ControlFlow::Continue(());
        }

        let last = self
            .file
            .node_tokens(node)
            .iter()
            .rev()
            .find(|t| !t.is_trivia())
            .filter(|t| !t.is_punct(";"));
        if let Some(last) = last {
            self.violations.push(
                self.metadata
                    .violation(self.file, last.span.end_pos, "Missing semicolon")
                    .with_suggestion(format!("Add ';' after '{}'", last.text)),
            );
        }
        ControlFlow::Continue(())
    }
}
