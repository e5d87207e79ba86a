//! JavaScript grammar.
//!
//! Recursive descent for statements, precedence climbing for binary operators.
//! Automatic semicolon insertion is honored at a line break, before `}` and at
//! the end of input, so rules can report on code the engine would accept.

use super::{PResult, ParseError, TokenStream, full_span};
use crate::lexer::{Token, TokenKind};
use crate::syntax::{NodeKind, SyntaxNode};

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

/// Words that can never be used as an identifier in expression position.
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "const", "continue", "debugger", "default", "do", "else", "enum",
    "export", "extends", "finally", "for", "if", "in", "instanceof", "return", "switch", "throw",
    "try", "var", "while", "with",
];

/// Tokens that close an expression context, so no operand can follow.
const OPERAND_TERMINATORS: &[&str] = &[")", "]", "}", ",", ";", ":", "=", "=>", "."];

pub(super) fn parse(tokens: &[Token]) -> PResult<SyntaxNode> {
    let mut parser = Parser {
        ts: TokenStream::new(tokens),
        no_in: false,
        in_expression: false,
    };

    let mut body = Vec::new();
    while !parser.ts.is_eof() {
        body.push(parser.statement()?);
    }

    Ok(SyntaxNode::new(NodeKind::Program, 0..tokens.len(), full_span(tokens)).with_children(body))
}

fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

fn is_binding_name(token: &Token) -> bool {
    token.kind == TokenKind::Identifier && !is_reserved(&token.text)
}

fn binary_precedence(token: &Token, no_in: bool) -> Option<u8> {
    let precedence = match (token.kind, token.text.as_str()) {
        (TokenKind::Punctuation, "??") => 1,
        (TokenKind::Punctuation, "||") => 2,
        (TokenKind::Punctuation, "&&") => 3,
        (TokenKind::Punctuation, "|") => 4,
        (TokenKind::Punctuation, "^") => 5,
        (TokenKind::Punctuation, "&") => 6,
        (TokenKind::Punctuation, "==" | "!=" | "===" | "!==") => 7,
        (TokenKind::Punctuation, "<" | ">" | "<=" | ">=") => 8,
        (TokenKind::Identifier, "instanceof") => 8,
        (TokenKind::Identifier, "in") if !no_in => 8,
        (TokenKind::Punctuation, "<<" | ">>" | ">>>") => 9,
        (TokenKind::Punctuation, "+" | "-") => 10,
        (TokenKind::Punctuation, "*" | "/" | "%") => 11,
        (TokenKind::Punctuation, "**") => 12,
        _ => return None,
    };
    Some(precedence)
}

struct Parser<'t> {
    ts: TokenStream<'t>,
    /// Set while parsing a `for` head, where `in` ends the left-hand side.
    no_in: bool,
    /// Set below the outermost expression of a statement.
    in_expression: bool,
}

impl<'t> Parser<'t> {
    /// Parse one more level of nesting.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.ts.enter()?;
        let result = parse(self);
        self.ts.exit();
        result
    }

    // ---- statements -------------------------------------------------------

    fn statement(&mut self) -> PResult<SyntaxNode> {
        let in_expression = std::mem::replace(&mut self.in_expression, false);
        let result = self.nested(Self::statement_inner);
        self.in_expression = in_expression;
        result
    }

    fn statement_inner(&mut self) -> PResult<SyntaxNode> {
        let Some(token) = self.ts.peek() else {
            return Err(self.ts.unexpected("Expected a statement"));
        };
        let start = self.ts.index();

        match (token.kind, token.text.as_str()) {
            (TokenKind::Punctuation, "{") => self.block(),
            (TokenKind::Punctuation, ";") => {
                self.ts.bump();
                Ok(self.ts.node(NodeKind::EmptyStatement, start))
            }
            (TokenKind::Identifier, word) => match word {
                "var" | "const" => self.variable_statement(),
                "let" if self.let_starts_declaration() => self.variable_statement(),
                "function" => self.function(NodeKind::FunctionDeclaration),
                "async" if self.nth_is_ident(1, "function") => {
                    self.function(NodeKind::FunctionDeclaration)
                }
                "class" => self.class(NodeKind::ClassDeclaration),
                "if" => self.if_statement(),
                "for" => self.for_statement(),
                "while" => self.while_statement(),
                "do" => self.do_while_statement(),
                "switch" => self.switch_statement(),
                "try" => self.try_statement(),
                "return" => self.return_statement(),
                "throw" => self.throw_statement(),
                "break" => self.jump_statement(NodeKind::BreakStatement),
                "continue" => self.jump_statement(NodeKind::ContinueStatement),
                "debugger" => {
                    self.ts.bump();
                    self.consume_semicolon()?;
                    Ok(self.ts.node(NodeKind::DebuggerStatement, start))
                }
                "import" if !self.nth_is_punct(1, "(") && !self.nth_is_punct(1, ".") => {
                    self.import_declaration()
                }
                "export" => self.export_declaration(),
                _ if !is_reserved(word) && self.nth_is_punct(1, ":") => self.labeled_statement(),
                _ => self.expression_statement(),
            },
            _ => self.expression_statement(),
        }
    }

    fn nth_is_punct(&self, n: usize, text: &str) -> bool {
        self.ts.peek_nth(n).is_some_and(|t| t.is_punct(text))
    }

    fn nth_is_ident(&self, n: usize, text: &str) -> bool {
        self.ts.peek_nth(n).is_some_and(|t| t.is_ident(text))
    }

    fn let_starts_declaration(&self) -> bool {
        self.ts
            .peek_nth(1)
            .is_some_and(|t| is_binding_name(t) || t.is_punct("[") || t.is_punct("{"))
    }

    /// Accept an explicit `;` or a position where one is inserted automatically.
    fn consume_semicolon(&mut self) -> PResult<()> {
        if self.ts.eat_punct(";")
            || self.ts.at_punct("}")
            || self.ts.is_eof()
            || self.ts.newline_before()
        {
            Ok(())
        } else {
            Err(self.ts.unexpected("Expected ';' or a line break"))
        }
    }

    /// Stretch `node` so it ends at the last consumed token.
    fn extend_to_prev(&self, mut node: SyntaxNode) -> SyntaxNode {
        let extended = self.ts.node(node.kind, node.tokens.start);
        node.tokens = extended.tokens;
        node.span = extended.span;
        node
    }

    fn block(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("{")?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut body = Vec::new();
        while !self.ts.at_punct("}") {
            if self.ts.is_eof() {
                return Err(self.ts.unexpected("Expected '}'"));
            }
            body.push(self.statement()?);
        }
        self.ts.bump();

        self.no_in = saved;
        Ok(self.ts.node(NodeKind::Block, start).with_children(body))
    }

    fn variable_statement(&mut self) -> PResult<SyntaxNode> {
        let declaration = self.variable_declaration()?;
        self.consume_semicolon()?;
        Ok(self.extend_to_prev(declaration))
    }

    fn variable_declaration(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let keyword = self.ts.tokens()[start].text.clone();

        let mut declarators = vec![self.variable_declarator()?];
        while self.ts.eat_punct(",") {
            declarators.push(self.variable_declarator()?);
        }

        Ok(self
            .ts
            .node(NodeKind::VariableDeclaration, start)
            .with_value(keyword)
            .with_children(declarators))
    }

    fn variable_declarator(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let mut children = vec![self.binding_target()?];
        if self.ts.eat_punct("=") {
            children.push(self.assignment()?);
        }
        Ok(self
            .ts
            .node(NodeKind::VariableDeclarator, start)
            .with_children(children))
    }

    fn binding_target(&mut self) -> PResult<SyntaxNode> {
        match self.ts.peek() {
            Some(t) if t.is_punct("[") => self.array_literal(),
            Some(t) if t.is_punct("{") => self.object_literal(),
            Some(t) if is_binding_name(t) => {
                let index = self.ts.bump();
                Ok(self.ts.leaf(NodeKind::Identifier, index))
            }
            _ => Err(self.ts.unexpected("Expected a binding name")),
        }
    }

    /// Optional name leaf for functions and classes.
    fn optional_name(&mut self) -> Option<SyntaxNode> {
        let token = self.ts.peek()?;
        if is_binding_name(token) {
            let index = self.ts.bump();
            Some(self.ts.leaf(NodeKind::Identifier, index))
        } else {
            None
        }
    }

    fn function(&mut self, kind: NodeKind) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        self.ts.eat_ident("async");
        if !self.ts.eat_ident("function") {
            return Err(self.ts.unexpected("Expected 'function'"));
        }
        self.ts.eat_punct("*");

        let mut children = Vec::new();
        let name = self.optional_name();
        let name_text = name.as_ref().and_then(|n| n.value.clone());
        children.extend(name);
        children.push(self.parameters()?);
        children.push(self.block()?);

        let node = self.ts.node(kind, start).with_children(children);
        Ok(match name_text {
            Some(name) => node.with_value(name),
            None => node,
        })
    }

    fn parameters(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("(")?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut params = Vec::new();
        while !self.ts.at_punct(")") {
            params.push(self.parameter()?);
            if !self.ts.eat_punct(",") {
                break;
            }
        }
        self.ts.expect_punct(")")?;

        self.no_in = saved;
        Ok(self
            .ts
            .node(NodeKind::Parameters, start)
            .with_children(params))
    }

    fn parameter(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        if self.ts.eat_punct("...") {
            let target = self.binding_target()?;
            return Ok(self
                .ts
                .node(NodeKind::SpreadElement, start)
                .with_children(vec![target]));
        }

        let target = self.binding_target()?;
        if self.ts.eat_punct("=") {
            let default = self.assignment()?;
            return Ok(self
                .ts
                .node(NodeKind::AssignmentExpression, start)
                .with_value("=")
                .with_children(vec![target, default]));
        }
        Ok(target)
    }

    fn class(&mut self, kind: NodeKind) -> PResult<SyntaxNode> {
        let start = self.ts.bump();

        let mut children = Vec::new();
        let name = self.optional_name();
        let name_text = name.as_ref().and_then(|n| n.value.clone());
        children.extend(name);
        if self.ts.eat_ident("extends") {
            children.push(self.call_member()?);
        }
        children.push(self.class_body()?);

        let node = self.ts.node(kind, start).with_children(children);
        Ok(match name_text {
            Some(name) => node.with_value(name),
            None => node,
        })
    }

    fn class_body(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("{")?;
        let mut members = Vec::new();

        loop {
            if self.ts.eat_punct("}") {
                break;
            }
            if self.ts.is_eof() {
                return Err(self.ts.unexpected("Expected '}'"));
            }
            if self.ts.eat_punct(";") {
                continue;
            }
            members.push(self.class_member()?);
        }

        Ok(self
            .ts
            .node(NodeKind::ClassBody, start)
            .with_children(members))
    }

    fn class_member(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();

        if self.ts.at_ident("static") && self.nth_is_punct(1, "{") {
            self.ts.bump();
            return self.block();
        }

        self.skip_member_modifiers(&["static", "async", "get", "set"], &["(", "=", ";", "}"]);
        let key = self.property_key()?;
        let name = key.value.clone();

        let node = if self.ts.at_punct("(") {
            let params = self.parameters()?;
            let body = self.block()?;
            self.ts
                .node(NodeKind::MethodDefinition, start)
                .with_children(vec![key, params, body])
        } else {
            let mut children = vec![key];
            if self.ts.eat_punct("=") {
                children.push(self.assignment()?);
            }
            self.consume_semicolon()?;
            self.ts
                .node(NodeKind::PropertyDefinition, start)
                .with_children(children)
        };

        Ok(match name {
            Some(name) => node.with_value(name),
            None => node,
        })
    }

    /// Skip `static`/`async`/`get`/`set`/`*` prefixes that are not themselves
    /// the member name.
    fn skip_member_modifiers(&mut self, words: &[&str], key_followers: &[&str]) {
        while let Some(token) = self.ts.peek() {
            if token.is_punct("*") {
                self.ts.bump();
                continue;
            }
            let is_modifier = token.kind == TokenKind::Identifier
                && words.contains(&token.text.as_str())
                && self.ts.peek_nth(1).is_some_and(|next| {
                    !(next.kind == TokenKind::Punctuation
                        && key_followers.contains(&next.text.as_str()))
                });
            if !is_modifier {
                break;
            }
            self.ts.bump();
        }
    }

    fn property_key(&mut self) -> PResult<SyntaxNode> {
        let Some(token) = self.ts.peek() else {
            return Err(self.ts.unexpected("Expected a property name"));
        };
        let kind = match token.kind {
            TokenKind::Identifier => NodeKind::Identifier,
            TokenKind::String => NodeKind::StringLiteral,
            TokenKind::Number => NodeKind::NumberLiteral,
            TokenKind::Punctuation if token.text == "[" => {
                self.ts.bump();
                let saved = std::mem::replace(&mut self.no_in, false);
                let key = self.assignment()?;
                self.ts.expect_punct("]")?;
                self.no_in = saved;
                return Ok(key);
            }
            _ => return Err(self.ts.unexpected("Expected a property name")),
        };
        let index = self.ts.bump();
        Ok(self.ts.leaf(kind, index))
    }

    fn if_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let test = self.condition()?;
        let consequent = self.statement()?;

        let mut children = vec![test, consequent];
        if self.ts.eat_ident("else") {
            children.push(self.statement()?);
        }

        Ok(self
            .ts
            .node(NodeKind::IfStatement, start)
            .with_children(children))
    }

    fn condition(&mut self) -> PResult<SyntaxNode> {
        self.ts.expect_punct("(")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let test = self.expression()?;
        self.ts.expect_punct(")")?;
        self.no_in = saved;
        Ok(test)
    }

    fn for_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        self.ts.eat_ident("await");
        self.ts.expect_punct("(")?;

        let mut children = Vec::new();

        if !self.ts.at_punct(";") {
            let saved = std::mem::replace(&mut self.no_in, true);
            let init = if self.ts.at_ident("var")
                || self.ts.at_ident("const")
                || (self.ts.at_ident("let") && self.let_starts_declaration())
            {
                self.variable_declaration()?
            } else {
                self.expression()?
            };
            self.no_in = saved;

            let flavor = if self.ts.at_ident("of") {
                Some("for-of")
            } else if self.ts.at_ident("in") {
                Some("for-in")
            } else {
                None
            };
            if let Some(flavor) = flavor {
                self.ts.bump();
                let right = self.expression()?;
                self.ts.expect_punct(")")?;
                let body = self.statement()?;
                return Ok(self
                    .ts
                    .node(NodeKind::ForStatement, start)
                    .with_value(flavor)
                    .with_children(vec![init, right, body]));
            }
            children.push(init);
        }

        self.ts.expect_punct(";")?;
        if !self.ts.at_punct(";") {
            children.push(self.expression()?);
        }
        self.ts.expect_punct(";")?;
        if !self.ts.at_punct(")") {
            children.push(self.expression()?);
        }
        self.ts.expect_punct(")")?;
        children.push(self.statement()?);

        Ok(self
            .ts
            .node(NodeKind::ForStatement, start)
            .with_value("for")
            .with_children(children))
    }

    fn while_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let test = self.condition()?;
        let body = self.statement()?;
        Ok(self
            .ts
            .node(NodeKind::WhileStatement, start)
            .with_children(vec![test, body]))
    }

    fn do_while_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let body = self.statement()?;
        if !self.ts.eat_ident("while") {
            return Err(self.ts.unexpected("Expected 'while'"));
        }
        let test = self.condition()?;
        // A semicolon is always inserted after the closing parenthesis.
        self.ts.eat_punct(";");
        Ok(self
            .ts
            .node(NodeKind::DoWhileStatement, start)
            .with_children(vec![body, test]))
    }

    fn switch_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let discriminant = self.condition()?;
        self.ts.expect_punct("{")?;

        let mut children = vec![discriminant];
        loop {
            if self.ts.eat_punct("}") {
                break;
            }
            let case_start = self.ts.index();
            let mut case_children = Vec::new();
            let label = if self.ts.eat_ident("case") {
                let saved = std::mem::replace(&mut self.no_in, false);
                case_children.push(self.expression()?);
                self.no_in = saved;
                "case"
            } else if self.ts.eat_ident("default") {
                "default"
            } else {
                return Err(self.ts.unexpected("Expected 'case', 'default' or '}'"));
            };
            self.ts.expect_punct(":")?;

            while !(self.ts.is_eof()
                || self.ts.at_punct("}")
                || self.ts.at_ident("case")
                || self.ts.at_ident("default"))
            {
                case_children.push(self.statement()?);
            }

            children.push(
                self.ts
                    .node(NodeKind::SwitchCase, case_start)
                    .with_value(label)
                    .with_children(case_children),
            );
        }

        Ok(self
            .ts
            .node(NodeKind::SwitchStatement, start)
            .with_children(children))
    }

    fn try_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let mut children = vec![self.block()?];

        if self.ts.at_ident("catch") {
            let catch_start = self.ts.bump();
            let mut catch_children = Vec::new();
            if self.ts.eat_punct("(") {
                catch_children.push(self.binding_target()?);
                self.ts.expect_punct(")")?;
            }
            catch_children.push(self.block()?);
            children.push(
                self.ts
                    .node(NodeKind::CatchClause, catch_start)
                    .with_children(catch_children),
            );
        }

        if self.ts.at_ident("finally") {
            let finally_start = self.ts.bump();
            let body = self.block()?;
            children.push(
                self.ts
                    .node(NodeKind::FinallyClause, finally_start)
                    .with_children(vec![body]),
            );
        }

        if children.len() == 1 {
            return Err(self.ts.unexpected("Expected 'catch' or 'finally'"));
        }

        Ok(self
            .ts
            .node(NodeKind::TryStatement, start)
            .with_children(children))
    }

    fn return_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let mut children = Vec::new();
        if !(self.ts.at_punct(";")
            || self.ts.at_punct("}")
            || self.ts.is_eof()
            || self.ts.newline_before())
        {
            children.push(self.expression()?);
        }
        self.consume_semicolon()?;
        Ok(self
            .ts
            .node(NodeKind::ReturnStatement, start)
            .with_children(children))
    }

    fn throw_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let argument = self.expression()?;
        self.consume_semicolon()?;
        Ok(self
            .ts
            .node(NodeKind::ThrowStatement, start)
            .with_children(vec![argument]))
    }

    fn jump_statement(&mut self, kind: NodeKind) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let mut children = Vec::new();
        if self.ts.peek().is_some_and(is_binding_name) && !self.ts.newline_before() {
            let index = self.ts.bump();
            children.push(self.ts.leaf(NodeKind::Identifier, index));
        }
        self.consume_semicolon()?;
        Ok(self.ts.node(kind, start).with_children(children))
    }

    fn labeled_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let label = self.ts.tokens()[start].text.clone();
        self.ts.expect_punct(":")?;
        let body = self.statement()?;
        Ok(self
            .ts
            .node(NodeKind::LabeledStatement, start)
            .with_value(label)
            .with_children(vec![body]))
    }

    fn module_source(&mut self) -> PResult<SyntaxNode> {
        if self.ts.at_kind(TokenKind::String) {
            let index = self.ts.bump();
            Ok(self.ts.leaf(NodeKind::StringLiteral, index))
        } else {
            Err(self.ts.unexpected("Expected a module specifier"))
        }
    }

    fn import_declaration(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();

        if !self.ts.at_kind(TokenKind::String) {
            loop {
                match self.ts.peek() {
                    Some(t) if t.is_ident("from") => {
                        self.ts.bump();
                        break;
                    }
                    Some(t) if !t.is_punct(";") => {
                        self.ts.bump();
                    }
                    _ => return Err(self.ts.unexpected("Expected 'from'")),
                }
            }
        }

        let source = self.module_source()?;
        self.consume_semicolon()?;
        Ok(self
            .ts
            .node(NodeKind::ImportDeclaration, start)
            .with_children(vec![source]))
    }

    fn export_declaration(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();

        let mut children = Vec::new();
        if self.ts.eat_ident("default") {
            let is_function = self.ts.at_ident("function")
                || (self.ts.at_ident("async") && self.nth_is_ident(1, "function"));
            if is_function {
                children.push(self.function(NodeKind::FunctionDeclaration)?);
            } else if self.ts.at_ident("class") {
                children.push(self.class(NodeKind::ClassDeclaration)?);
            } else {
                children.push(self.assignment()?);
                self.consume_semicolon()?;
            }
        } else if self.ts.at_punct("{") || self.ts.at_punct("*") {
            self.skip_export_specifiers()?;
            if self.ts.eat_ident("from") {
                children.push(self.module_source()?);
            }
            self.consume_semicolon()?;
        } else {
            children.push(self.statement()?);
        }

        Ok(self
            .ts
            .node(NodeKind::ExportDeclaration, start)
            .with_children(children))
    }

    /// `{ a, b as c }` or `* as ns`.
    fn skip_export_specifiers(&mut self) -> PResult<()> {
        if self.ts.eat_punct("*") {
            if self.ts.eat_ident("as") {
                self.ts.bump();
            }
            return Ok(());
        }
        self.ts.expect_punct("{")?;
        while !self.ts.eat_punct("}") {
            if self.ts.is_eof() {
                return Err(self.ts.unexpected("Expected '}'"));
            }
            self.ts.bump();
        }
        Ok(())
    }

    fn expression_statement(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let expression = self.expression()?;
        self.consume_semicolon()?;
        Ok(self
            .ts
            .node(NodeKind::ExpressionStatement, start)
            .with_children(vec![expression]))
    }

    // ---- expressions ------------------------------------------------------

    fn expression(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let first = self.assignment()?;
        if !self.ts.at_punct(",") {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.ts.eat_punct(",") {
            items.push(self.assignment()?);
        }
        Ok(self
            .ts
            .node(NodeKind::SequenceExpression, start)
            .with_children(items))
    }

    /// An expression below another expression adds a level; the outermost
    /// expression of a statement shares the statement's level.
    fn assignment(&mut self) -> PResult<SyntaxNode> {
        if self.in_expression {
            return self.nested(Self::assignment_inner);
        }
        self.in_expression = true;
        let result = self.assignment_inner();
        self.in_expression = false;
        result
    }

    fn assignment_inner(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();

        if let Some(token) = self.ts.peek() {
            if is_binding_name(token) && self.nth_is_punct(1, "=>") {
                let index = self.ts.bump();
                let params = self.single_parameter(index);
                return self.arrow_function(start, params);
            }
            if token.is_ident("async")
                && self.ts.peek_nth(1).is_some_and(is_binding_name)
                && self.nth_is_punct(2, "=>")
            {
                self.ts.bump();
                let index = self.ts.bump();
                let params = self.single_parameter(index);
                return self.arrow_function(start, params);
            }
            if token.is_ident("yield") {
                return self.yield_expression();
            }
        }

        let left = self.conditional()?;

        if self.ts.at_punct("=>") {
            let params = arrow_parameters(left)?;
            return self.arrow_function(start, params);
        }

        let operator = self
            .ts
            .peek()
            .filter(|t| {
                t.kind == TokenKind::Punctuation && ASSIGNMENT_OPERATORS.contains(&t.text.as_str())
            })
            .map(|t| t.text.clone());
        if let Some(operator) = operator {
            self.ts.bump();
            let right = self.assignment()?;
            return Ok(self
                .ts
                .node(NodeKind::AssignmentExpression, start)
                .with_value(operator)
                .with_children(vec![left, right]));
        }

        Ok(left)
    }

    fn single_parameter(&self, index: usize) -> SyntaxNode {
        let param = self.ts.leaf(NodeKind::Identifier, index);
        SyntaxNode::new(NodeKind::Parameters, index..index + 1, param.span)
            .with_children(vec![param])
    }

    fn arrow_function(&mut self, start: usize, params: SyntaxNode) -> PResult<SyntaxNode> {
        self.ts.expect_punct("=>")?;
        let body = if self.ts.at_punct("{") {
            self.block()?
        } else {
            self.assignment()?
        };
        Ok(self
            .ts
            .node(NodeKind::ArrowFunction, start)
            .with_children(vec![params, body]))
    }

    /// True when the `n`th token ahead can begin an operand.
    fn operand_follows(&self, n: usize) -> bool {
        self.ts.peek_nth(n).is_some_and(|t| {
            !(t.kind == TokenKind::Punctuation && OPERAND_TERMINATORS.contains(&t.text.as_str()))
        })
    }

    fn yield_expression(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let delegate = !self.ts.newline_before() && self.ts.eat_punct("*");

        let mut children = Vec::new();
        if delegate || (self.operand_follows(0) && !self.ts.newline_before()) {
            children.push(self.assignment()?);
        }

        Ok(self
            .ts
            .node(NodeKind::UnaryExpression, start)
            .with_value(if delegate { "yield*" } else { "yield" })
            .with_children(children))
    }

    fn conditional(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let test = self.binary(0)?;
        if !self.ts.eat_punct("?") {
            return Ok(test);
        }

        let saved = std::mem::replace(&mut self.no_in, false);
        let consequent = self.assignment()?;
        self.no_in = saved;
        self.ts.expect_punct(":")?;
        let alternate = self.assignment()?;

        Ok(self
            .ts
            .node(NodeKind::ConditionalExpression, start)
            .with_children(vec![test, consequent, alternate]))
    }

    fn binary(&mut self, min_precedence: u8) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let mut left = self.unary()?;

        while let Some((precedence, operator)) = self.ts.peek().and_then(|t| {
            binary_precedence(t, self.no_in).map(|precedence| (precedence, t.text.clone()))
        }) {
            if precedence < min_precedence {
                break;
            }
            self.ts.bump();
            // `**` is right associative.
            let right = if operator == "**" {
                self.nested(|parser| parser.binary(precedence))?
            } else {
                self.binary(precedence + 1)?
            };
            left = self
                .ts
                .node(NodeKind::BinaryExpression, start)
                .with_value(operator)
                .with_children(vec![left, right]);
        }

        Ok(left)
    }

    fn unary(&mut self) -> PResult<SyntaxNode> {
        let Some(token) = self.ts.peek() else {
            return Err(self.ts.unexpected("Expected an expression"));
        };
        let start = self.ts.index();

        let is_prefix = match token.kind {
            TokenKind::Punctuation => {
                matches!(token.text.as_str(), "!" | "~" | "+" | "-" | "++" | "--")
            }
            TokenKind::Identifier => match token.text.as_str() {
                "typeof" | "void" | "delete" => true,
                "await" => self.operand_follows(1),
                _ => false,
            },
            _ => false,
        };
        if !is_prefix {
            return self.postfix();
        }

        let operator = token.text.clone();
        self.ts.bump();
        let operand = self.nested(Self::unary)?;

        let kind = if operator == "++" || operator == "--" {
            NodeKind::UpdateExpression
        } else {
            NodeKind::UnaryExpression
        };
        Ok(self
            .ts
            .node(kind, start)
            .with_value(operator)
            .with_children(vec![operand]))
    }

    fn postfix(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let operand = self.call_member()?;

        let operator = self
            .ts
            .peek()
            .filter(|t| t.is_punct("++") || t.is_punct("--"))
            .map(|t| t.text.clone());
        match operator {
            // A line break before `++`/`--` ends the statement instead.
            Some(operator) if !self.ts.newline_before() => {
                self.ts.bump();
                Ok(self
                    .ts
                    .node(NodeKind::UpdateExpression, start)
                    .with_value(operator)
                    .with_children(vec![operand]))
            }
            _ => Ok(operand),
        }
    }

    fn call_member(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let mut expr = if self.ts.at_ident("new") {
            self.new_expression()?
        } else {
            self.primary()?
        };

        while let Some(token) = self.ts.peek() {
            expr = match (token.kind, token.text.as_str()) {
                (TokenKind::Punctuation, ".") => {
                    self.ts.bump();
                    let property = self.property_name()?;
                    self.member(start, ".", expr, property)
                }
                (TokenKind::Punctuation, "?.") => {
                    self.ts.bump();
                    if self.ts.at_punct("(") {
                        let args = self.arguments()?;
                        self.ts
                            .node(NodeKind::CallExpression, start)
                            .with_value("?.")
                            .with_children(vec![expr, args])
                    } else if self.ts.at_punct("[") {
                        let property = self.computed_property()?;
                        self.member(start, "?.[]", expr, property)
                    } else {
                        let property = self.property_name()?;
                        self.member(start, "?.", expr, property)
                    }
                }
                (TokenKind::Punctuation, "[") => {
                    let property = self.computed_property()?;
                    self.member(start, "[]", expr, property)
                }
                (TokenKind::Punctuation, "(") => {
                    let args = self.arguments()?;
                    self.ts
                        .node(NodeKind::CallExpression, start)
                        .with_children(vec![expr, args])
                }
                (TokenKind::String, text) if text.starts_with('`') => {
                    let index = self.ts.bump();
                    let template = self.ts.leaf(NodeKind::TemplateLiteral, index);
                    self.ts
                        .node(NodeKind::CallExpression, start)
                        .with_children(vec![expr, template])
                }
                _ => break,
            };
        }

        Ok(expr)
    }

    fn member(
        &self,
        start: usize,
        access: &str,
        object: SyntaxNode,
        property: SyntaxNode,
    ) -> SyntaxNode {
        self.ts
            .node(NodeKind::MemberExpression, start)
            .with_value(access)
            .with_children(vec![object, property])
    }

    fn property_name(&mut self) -> PResult<SyntaxNode> {
        if self.ts.at_kind(TokenKind::Identifier) {
            let index = self.ts.bump();
            Ok(self.ts.leaf(NodeKind::Identifier, index))
        } else {
            Err(self.ts.unexpected("Expected a property name"))
        }
    }

    fn computed_property(&mut self) -> PResult<SyntaxNode> {
        self.ts.expect_punct("[")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let property = self.expression()?;
        self.ts.expect_punct("]")?;
        self.no_in = saved;
        Ok(property)
    }

    fn new_expression(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();

        if self.ts.eat_punct(".") {
            let property = self.property_name()?;
            return Ok(self
                .ts
                .node(NodeKind::MemberExpression, start)
                .with_value("new.")
                .with_children(vec![property]));
        }

        let callee = self.nested(|parser| {
            if parser.ts.at_ident("new") {
                parser.new_expression()
            } else {
                parser.member_only()
            }
        })?;

        let mut children = vec![callee];
        if self.ts.at_punct("(") {
            children.push(self.arguments()?);
        }
        Ok(self
            .ts
            .node(NodeKind::NewExpression, start)
            .with_children(children))
    }

    /// Member chain without calls, the callee of `new`.
    fn member_only(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        let mut expr = self.primary()?;
        loop {
            if self.ts.eat_punct(".") {
                let property = self.property_name()?;
                expr = self.member(start, ".", expr, property);
            } else if self.ts.at_punct("[") {
                let property = self.computed_property()?;
                expr = self.member(start, "[]", expr, property);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn arguments(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("(")?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut args = Vec::new();
        while !self.ts.at_punct(")") {
            args.push(self.spread_or_assignment()?);
            if !self.ts.eat_punct(",") {
                break;
            }
        }
        self.ts.expect_punct(")")?;

        self.no_in = saved;
        Ok(self
            .ts
            .node(NodeKind::Arguments, start)
            .with_children(args))
    }

    fn spread_or_assignment(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        if self.ts.eat_punct("...") {
            let argument = self.assignment()?;
            Ok(self
                .ts
                .node(NodeKind::SpreadElement, start)
                .with_children(vec![argument]))
        } else {
            self.assignment()
        }
    }

    fn primary(&mut self) -> PResult<SyntaxNode> {
        let Some(token) = self.ts.peek() else {
            return Err(self.ts.unexpected("Expected an expression"));
        };
        let index = self.ts.index();

        match token.kind {
            TokenKind::Identifier => match token.text.as_str() {
                "function" => self.function(NodeKind::FunctionExpression),
                "async" if self.nth_is_ident(1, "function") => {
                    self.function(NodeKind::FunctionExpression)
                }
                "class" => self.class(NodeKind::ClassExpression),
                "this" | "super" | "null" | "true" | "false" => {
                    self.ts.bump();
                    Ok(self.ts.leaf(NodeKind::Literal, index))
                }
                word if is_reserved(word) => Err(ParseError::new(
                    format!("Unexpected keyword '{word}'"),
                    token.span.start_pos,
                )),
                _ => {
                    self.ts.bump();
                    Ok(self.ts.leaf(NodeKind::Identifier, index))
                }
            },
            TokenKind::String => {
                self.ts.bump();
                let kind = if token.text.starts_with('`') {
                    NodeKind::TemplateLiteral
                } else {
                    NodeKind::StringLiteral
                };
                Ok(self.ts.leaf(kind, index))
            }
            TokenKind::Number => {
                self.ts.bump();
                Ok(self.ts.leaf(NodeKind::NumberLiteral, index))
            }
            TokenKind::Regex => {
                self.ts.bump();
                Ok(self.ts.leaf(NodeKind::RegexLiteral, index))
            }
            TokenKind::Punctuation => match token.text.as_str() {
                "(" => self.parenthesized(),
                "[" => self.array_literal(),
                "{" => self.object_literal(),
                other => Err(ParseError::new(
                    format!("Unexpected token '{other}'"),
                    token.span.start_pos,
                )),
            },
            _ => Err(self.ts.unexpected("Expected an expression")),
        }
    }

    /// `( ... )`, which may turn out to be an arrow function's parameter list.
    fn parenthesized(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut items = Vec::new();
        while !self.ts.at_punct(")") {
            items.push(self.spread_or_assignment()?);
            if !self.ts.eat_punct(",") {
                break;
            }
        }
        let close = self.ts.expect_punct(")")?;
        self.no_in = saved;

        if items.is_empty() && !self.ts.at_punct("=>") {
            return Err(ParseError::new(
                "Unexpected token ')'",
                self.ts.tokens()[close].span.start_pos,
            ));
        }

        Ok(self
            .ts
            .node(NodeKind::ParenthesizedExpression, start)
            .with_children(items))
    }

    fn array_literal(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("[")?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut elements = Vec::new();
        loop {
            if self.ts.at_punct("]") {
                break;
            }
            // Hole, as in `[a, , b]`.
            if self.ts.eat_punct(",") {
                continue;
            }
            elements.push(self.spread_or_assignment()?);
            if !self.ts.eat_punct(",") {
                break;
            }
        }
        self.ts.expect_punct("]")?;

        self.no_in = saved;
        Ok(self
            .ts
            .node(NodeKind::ArrayLiteral, start)
            .with_children(elements))
    }

    fn object_literal(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("{")?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut properties = Vec::new();
        while !self.ts.at_punct("}") {
            properties.push(self.object_member()?);
            if !self.ts.eat_punct(",") {
                break;
            }
        }
        self.ts.expect_punct("}")?;

        self.no_in = saved;
        Ok(self
            .ts
            .node(NodeKind::ObjectLiteral, start)
            .with_children(properties))
    }

    fn object_member(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        if self.ts.eat_punct("...") {
            let argument = self.assignment()?;
            return Ok(self
                .ts
                .node(NodeKind::SpreadElement, start)
                .with_children(vec![argument]));
        }

        self.skip_member_modifiers(&["async", "get", "set"], &["(", ":", ",", "}", "="]);
        let key = self.property_key()?;
        let name = key.value.clone();

        let mut children = vec![key];
        if self.ts.at_punct("(") {
            let method_start = self.ts.index();
            let params = self.parameters()?;
            let body = self.block()?;
            children.push(
                self.ts
                    .node(NodeKind::FunctionExpression, method_start)
                    .with_children(vec![params, body]),
            );
        } else if self.ts.eat_punct(":") || self.ts.eat_punct("=") {
            // `=` only appears in destructuring defaults, `{ a = 1 } = obj`.
            children.push(self.assignment()?);
        }

        let node = self
            .ts
            .node(NodeKind::Property, start)
            .with_children(children);
        Ok(match name {
            Some(name) => node.with_value(name),
            None => node,
        })
    }
}

/// Reinterpret the expression before `=>` as a parameter list.
fn arrow_parameters(left: SyntaxNode) -> PResult<SyntaxNode> {
    match left.kind {
        NodeKind::Identifier => {
            Ok(SyntaxNode::new(NodeKind::Parameters, left.tokens.clone(), left.span)
                .with_children(vec![left]))
        }
        NodeKind::ParenthesizedExpression => {
            Ok(SyntaxNode::new(NodeKind::Parameters, left.tokens, left.span)
                .with_children(left.children))
        }
        NodeKind::CallExpression
            if left
                .children
                .first()
                .is_some_and(|callee| callee.is(NodeKind::Identifier) && callee.value() == Some("async")) =>
        {
            match left.children.into_iter().nth(1) {
                Some(args) if args.is(NodeKind::Arguments) => {
                    Ok(SyntaxNode::new(NodeKind::Parameters, args.tokens, args.span)
                        .with_children(args.children))
                }
                _ => Err(ParseError::new(
                    "Invalid arrow function parameters",
                    left.span.start_pos,
                )),
            }
        }
        _ => Err(ParseError::new(
            "Invalid arrow function parameters",
            left.span.start_pos,
        )),
    }
}
