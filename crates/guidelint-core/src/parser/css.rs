//! CSS grammar: rulesets, declarations and at-rules.

use super::{PResult, TokenStream, full_span};
use crate::lexer::{Token, TokenKind};
use crate::syntax::{NodeKind, SyntaxNode};

pub(super) fn parse(tokens: &[Token]) -> PResult<SyntaxNode> {
    let mut parser = Parser {
        ts: TokenStream::new(tokens),
    };

    let mut rules = Vec::new();
    while let Some(token) = parser.ts.peek() {
        if token.is_punct("}") {
            return Err(parser.ts.error_here("Unexpected '}'"));
        }
        rules.push(parser.rule()?);
    }

    Ok(SyntaxNode::new(NodeKind::Stylesheet, 0..tokens.len(), full_span(tokens)).with_children(rules))
}

fn is_at_keyword(token: &Token) -> bool {
    token.kind == TokenKind::Identifier && token.text.starts_with('@')
}

/// Source text of `tokens`, with runs of layout collapsed to one space.
fn normalized_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for token in tokens {
        match token.kind {
            TokenKind::Comment => {}
            TokenKind::Whitespace | TokenKind::Newline => {
                if !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            _ => text.push_str(&token.text),
        }
    }
    text.trim_end().to_string()
}

struct Parser<'t> {
    ts: TokenStream<'t>,
}

impl Parser<'_> {
    fn rule(&mut self) -> PResult<SyntaxNode> {
        self.ts.enter()?;
        let result = match self.ts.peek() {
            Some(token) if is_at_keyword(token) => self.at_rule(),
            _ => self.ruleset(),
        };
        self.ts.exit();
        result
    }

    fn ruleset(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        self.skip_prelude(&["{"])?;
        if self.ts.index() == start {
            return Err(self.ts.unexpected("Expected a selector"));
        }

        let end = self.ts.prev_index().map_or(start, |prev| prev + 1);
        let text = normalized_text(&self.ts.tokens()[start..end]);
        let selector = self
            .ts
            .node_between(NodeKind::Selector, start, end)
            .with_value(text);

        let block = self.declaration_block()?;
        Ok(self
            .ts
            .node(NodeKind::RuleSet, start)
            .with_children(vec![selector, block]))
    }

    fn at_rule(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let name = self.ts.tokens()[start].text.to_ascii_lowercase();

        self.skip_prelude(&["{", ";"])?;

        let mut children = Vec::new();
        if self.ts.at_punct("{") {
            children.push(self.declaration_block()?);
        } else {
            self.ts.expect_punct(";")?;
        }

        Ok(self
            .ts
            .node(NodeKind::AtRule, start)
            .with_value(name)
            .with_children(children))
    }

    /// Consume tokens up to (not including) one of `stops` at nesting level 0.
    fn skip_prelude(&mut self, stops: &[&str]) -> PResult<()> {
        let mut depth = 0usize;
        loop {
            let Some(token) = self.ts.peek() else {
                let expected = stops
                    .iter()
                    .map(|s| format!("'{s}'"))
                    .collect::<Vec<_>>()
                    .join(" or ");
                return Err(self.ts.unexpected(&format!("Expected {expected}")));
            };
            if token.kind == TokenKind::Punctuation {
                match token.text.as_str() {
                    text if depth == 0 && stops.contains(&text) => return Ok(()),
                    "(" | "[" => depth += 1,
                    ")" | "]" => depth = depth.saturating_sub(1),
                    "}" | ";" if depth == 0 => {
                        return Err(self.ts.error_here(format!("Unexpected '{}'", token.text)));
                    }
                    _ => {}
                }
            }
            self.ts.bump();
        }
    }

    /// `{ ... }` holding declarations, nested rulesets or at-rules.
    fn declaration_block(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.expect_punct("{")?;
        let mut children = Vec::new();

        loop {
            while self.ts.eat_punct(";") {}
            let Some(token) = self.ts.peek() else {
                return Err(self.ts.unexpected("Expected '}'"));
            };
            if token.is_punct("}") {
                self.ts.bump();
                break;
            }
            if is_at_keyword(token) || self.block_follows() {
                children.push(self.rule()?);
            } else {
                children.push(self.declaration()?);
            }
        }

        Ok(self
            .ts
            .node(NodeKind::DeclarationBlock, start)
            .with_children(children))
    }

    /// True when a `{` comes before the next `;` or `}`, i.e. a nested rule.
    fn block_follows(&self) -> bool {
        let mut depth = 0usize;
        for token in &self.ts.tokens()[self.ts.index()..] {
            if token.kind != TokenKind::Punctuation {
                continue;
            }
            match token.text.as_str() {
                "(" | "[" => depth += 1,
                ")" | "]" => depth = depth.saturating_sub(1),
                "{" if depth == 0 => return true,
                ";" | "}" if depth == 0 => return false,
                _ => {}
            }
        }
        false
    }

    fn declaration(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.index();
        if !self.ts.at_kind(TokenKind::Identifier) {
            return Err(self.ts.unexpected("Expected a property name"));
        }
        self.ts.bump();
        let property = self.ts.tokens()[start].text.clone();
        self.ts.expect_punct(":")?;

        let mut depth = 0usize;
        while let Some(token) = self.ts.peek() {
            if token.kind == TokenKind::Punctuation {
                match token.text.as_str() {
                    "(" | "[" => depth += 1,
                    ")" | "]" => depth = depth.saturating_sub(1),
                    ";" | "}" if depth == 0 => break,
                    "{" => return Err(self.ts.error_here("Unexpected '{' in declaration value")),
                    _ => {}
                }
            }
            self.ts.bump();
        }
        // The last declaration of a block may omit its semicolon.
        if !self.ts.eat_punct(";") && !self.ts.at_punct("}") {
            return Err(self.ts.unexpected("Expected ';' or '}'"));
        }

        Ok(self
            .ts
            .node(NodeKind::Declaration, start)
            .with_value(property))
    }
}
