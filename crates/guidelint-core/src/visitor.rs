//! Visitor for uniform syntax tree traversal.

use std::ops::ControlFlow;

use crate::syntax::SyntaxNode;

pub trait SyntaxVisitor {
    /// Called before a node's children. `ancestors` ends with the direct parent.
    fn enter(&mut self, _node: &SyntaxNode, _ancestors: &[&SyntaxNode]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn leave(&mut self, _node: &SyntaxNode, _ancestors: &[&SyntaxNode]) {}
}

/// Walk `root` depth first. Returning `Break` from `enter` stops the walk.
pub fn walk<V: SyntaxVisitor>(root: &SyntaxNode, visitor: &mut V) {
    let mut ancestors = Vec::new();
    let _ = walk_node(root, visitor, &mut ancestors);
}

fn walk_node<'a, V: SyntaxVisitor>(
    node: &'a SyntaxNode,
    visitor: &mut V,
    ancestors: &mut Vec<&'a SyntaxNode>,
) -> ControlFlow<()> {
    visitor.enter(node, ancestors.as_slice())?;
    ancestors.push(node);
    for child in &node.children {
        if walk_node(child, visitor, ancestors).is_break() {
            ancestors.pop();
            return ControlFlow::Break(());
        }
    }
    ancestors.pop();
    visitor.leave(node, ancestors.as_slice());
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::parser::ParsedFile;
    use crate::syntax::NodeKind;

    struct KindCollector {
        entered: Vec<(NodeKind, Option<NodeKind>)>,
        left: usize,
    }

    impl SyntaxVisitor for KindCollector {
        fn enter(&mut self, node: &SyntaxNode, ancestors: &[&SyntaxNode]) -> ControlFlow<()> {
            self.entered
                .push((node.kind, ancestors.last().map(|parent| parent.kind)));
            ControlFlow::Continue(())
        }

        fn leave(&mut self, _node: &SyntaxNode, _ancestors: &[&SyntaxNode]) {
            self.left += 1;
        }
    }

    struct StopAtFirstIdentifier {
        seen: usize,
    }

    impl SyntaxVisitor for StopAtFirstIdentifier {
        fn enter(&mut self, node: &SyntaxNode, _ancestors: &[&SyntaxNode]) -> ControlFlow<()> {
            self.seen += 1;
            if node.is(NodeKind::Identifier) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[test]
    fn walk_reports_parents() {
        let file = ParsedFile::parse("a.js", "x;", Language::JavaScript).unwrap();
        let mut collector = KindCollector {
            entered: Vec::new(),
            left: 0,
        };

        walk(file.root(), &mut collector);

        assert_eq!(
            collector.entered,
            vec![
                (NodeKind::Program, None),
                (NodeKind::ExpressionStatement, Some(NodeKind::Program)),
                (NodeKind::Identifier, Some(NodeKind::ExpressionStatement)),
            ]
        );
        assert_eq!(collector.left, 3);
    }

    #[test]
    fn break_stops_the_walk() {
        let file = ParsedFile::parse("a.js", "a; b; c;", Language::JavaScript).unwrap();
        let mut visitor = StopAtFirstIdentifier { seen: 0 };

        walk(file.root(), &mut visitor);

        assert_eq!(visitor.seen, 3);
    }
}
