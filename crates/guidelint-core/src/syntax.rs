//! Syntax tree shared by the JavaScript, CSS and HTML grammars.
//!
//! Nodes own their children, so a tree has exactly one owner and no cycles.
//! Each node remembers the range of tokens it was built from; rules use it to
//! look at trivia (spacing, newlines, comments) that the grammar skips.

use std::ops::Range;

use crate::lexer::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // JavaScript
    Program,
    Block,
    EmptyStatement,
    ExpressionStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ClassDeclaration,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,
    IfStatement,
    ForStatement,
    WhileStatement,
    DoWhileStatement,
    SwitchStatement,
    SwitchCase,
    TryStatement,
    CatchClause,
    FinallyClause,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    DebuggerStatement,
    LabeledStatement,
    ImportDeclaration,
    ExportDeclaration,
    Identifier,
    Literal,
    StringLiteral,
    TemplateLiteral,
    NumberLiteral,
    RegexLiteral,
    ArrayLiteral,
    ObjectLiteral,
    Property,
    SpreadElement,
    FunctionExpression,
    ArrowFunction,
    ClassExpression,
    Parameters,
    NewExpression,
    CallExpression,
    Arguments,
    MemberExpression,
    BinaryExpression,
    AssignmentExpression,
    UnaryExpression,
    UpdateExpression,
    ConditionalExpression,
    SequenceExpression,
    ParenthesizedExpression,

    // CSS
    Stylesheet,
    RuleSet,
    Selector,
    DeclarationBlock,
    Declaration,
    AtRule,

    // HTML
    Document,
    Doctype,
    Element,
    Attribute,
    Text,
    Comment,
}

impl NodeKind {
    /// Statements whose body may be a single statement instead of a block.
    pub fn is_control_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::IfStatement
                | NodeKind::ForStatement
                | NodeKind::WhileStatement
                | NodeKind::DoWhileStatement
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunction
                | NodeKind::MethodDefinition
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    /// Indices into the token vector the tree was parsed from.
    pub tokens: Range<usize>,
    /// Identifier name, operator, keyword, property or attribute name.
    pub value: Option<String>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, tokens: Range<usize>, span: Span) -> Self {
        Self {
            kind,
            span,
            tokens,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn child(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn line(&self) -> usize {
        self.span.start_pos.line
    }

    pub fn column(&self) -> usize {
        self.span.start_pos.column
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
