//! HTML grammar.
//!
//! Builds the element tree with an explicit stack of open elements. Void
//! elements never take children, and elements with optional end tags are
//! closed when a sibling or an ancestor's end tag makes that unambiguous.

use super::{MAX_NESTING_DEPTH, PResult, ParseError, TokenStream, full_span};
use crate::lexer::{Token, TokenKind};
use crate::syntax::{NodeKind, SyntaxNode};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Start tags that close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

pub(super) fn parse(tokens: &[Token]) -> PResult<SyntaxNode> {
    let mut parser = Parser {
        ts: TokenStream::keeping_comments(tokens),
        open: Vec::new(),
        finished: Vec::new(),
    };
    parser.document()?;

    Ok(
        SyntaxNode::new(NodeKind::Document, 0..tokens.len(), full_span(tokens))
            .with_children(parser.finished),
    )
}

/// True when an open `current` element ends implicitly before a `next` start tag.
fn implicitly_closed_by(current: &str, next: &str) -> bool {
    match current {
        "p" => CLOSES_PARAGRAPH.contains(&next),
        "li" => next == "li",
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "tr" => next == "tr",
        "td" | "th" => matches!(next, "td" | "th" | "tr"),
        "option" => matches!(next, "option" | "optgroup"),
        "thead" | "tbody" => matches!(next, "tbody" | "tfoot"),
        _ => false,
    }
}

struct OpenElement {
    name: String,
    start: usize,
    children: Vec<SyntaxNode>,
}

struct Parser<'t> {
    ts: TokenStream<'t>,
    open: Vec<OpenElement>,
    finished: Vec<SyntaxNode>,
}

impl Parser<'_> {
    fn document(&mut self) -> PResult<()> {
        while let Some(token) = self.ts.peek() {
            let index = self.ts.index();
            match token.kind {
                TokenKind::Directive => {
                    self.ts.bump();
                    let node = self.ts.leaf(NodeKind::Doctype, index);
                    self.append(node);
                }
                TokenKind::Comment => {
                    self.ts.bump();
                    let node = self.ts.leaf(NodeKind::Comment, index);
                    self.append(node);
                }
                TokenKind::Text => self.text(),
                TokenKind::Punctuation if token.text == "<" => self.start_tag()?,
                TokenKind::Punctuation if token.text == "</" => self.end_tag()?,
                _ => return Err(self.ts.unexpected("Malformed markup")),
            }
        }

        let end = self.consumed_end();
        while !self.open.is_empty() {
            self.close_top(end);
        }
        Ok(())
    }

    fn consumed_end(&self) -> usize {
        self.ts.prev_index().map_or(0, |prev| prev + 1)
    }

    fn append(&mut self, node: SyntaxNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.finished.push(node),
        }
    }

    /// Close the innermost open element, ending it before token `end`.
    fn close_top(&mut self, end: usize) {
        if let Some(element) = self.open.pop() {
            let node = self
                .ts
                .node_between(NodeKind::Element, element.start, end)
                .with_value(element.name)
                .with_children(element.children);
            self.append(node);
        }
    }

    /// Consecutive words and spaces of character data form one node.
    fn text(&mut self) {
        let start = self.ts.index();
        while self.ts.at_kind(TokenKind::Text) {
            self.ts.bump();
        }
        let end = self.consumed_end();
        let text: String = self.ts.tokens()[start..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        let node = self
            .ts
            .node_between(NodeKind::Text, start, end)
            .with_value(text);
        self.append(node);
    }

    fn start_tag(&mut self) -> PResult<()> {
        let start = self.ts.index();
        let name = match self.ts.peek_nth(1) {
            Some(token) if token.kind == TokenKind::Identifier => token.text.to_ascii_lowercase(),
            _ => return Err(self.ts.error_here("Malformed start tag")),
        };

        let before_tag = self.consumed_end();
        while self
            .open
            .last()
            .is_some_and(|current| implicitly_closed_by(&current.name, &name))
        {
            self.close_top(before_tag);
        }

        self.ts.bump();
        self.ts.bump();

        let mut children = Vec::new();
        let self_closing = loop {
            let Some(token) = self.ts.peek() else {
                return Err(ParseError::new(
                    format!("Unterminated tag <{name}>"),
                    self.ts.tokens()[start].span.start_pos,
                ));
            };
            match token.kind {
                TokenKind::Identifier => children.push(self.attribute()?),
                TokenKind::Punctuation if token.text == ">" => {
                    self.ts.bump();
                    break false;
                }
                TokenKind::Punctuation if token.text == "/>" => {
                    self.ts.bump();
                    break true;
                }
                _ => return Err(self.ts.unexpected(&format!("Malformed tag <{name}>"))),
            }
        };

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            let node = self
                .ts
                .node(NodeKind::Element, start)
                .with_value(name)
                .with_children(children);
            self.append(node);
        } else {
            if self.open.len() >= MAX_NESTING_DEPTH {
                return Err(ParseError::new(
                    "Nesting too deep",
                    self.ts.tokens()[start].span.start_pos,
                ));
            }
            self.open.push(OpenElement {
                name,
                start,
                children,
            });
        }
        Ok(())
    }

    fn attribute(&mut self) -> PResult<SyntaxNode> {
        let start = self.ts.bump();
        let name = self.ts.tokens()[start].text.clone();

        let mut children = Vec::new();
        if self.ts.eat_punct("=") {
            let kind = match self.ts.peek() {
                Some(t) if t.kind == TokenKind::String => NodeKind::StringLiteral,
                Some(t) if t.kind == TokenKind::Identifier => NodeKind::Identifier,
                _ => return Err(self.ts.unexpected(&format!("Expected a value for '{name}'"))),
            };
            let index = self.ts.bump();
            children.push(self.ts.leaf(kind, index));
        }

        Ok(self
            .ts
            .node(NodeKind::Attribute, start)
            .with_value(name)
            .with_children(children))
    }

    fn end_tag(&mut self) -> PResult<()> {
        let start = self.ts.index();
        let before_tag = self.consumed_end();
        let at = self.ts.tokens()[start].span.start_pos;

        self.ts.bump();
        let name = match self.ts.peek() {
            Some(token) if token.kind == TokenKind::Identifier => token.text.to_ascii_lowercase(),
            _ => return Err(ParseError::new("Malformed end tag", at)),
        };
        self.ts.bump();
        if !self.ts.eat_punct(">") {
            return Err(self.ts.unexpected(&format!("Malformed end tag </{name}>")));
        }

        let Some(depth) = self.open.iter().rposition(|open| open.name == name) else {
            return Err(ParseError::new(
                format!("Unexpected closing tag </{name}>"),
                at,
            ));
        };

        while self.open.len() > depth + 1 {
            self.close_top(before_tag);
        }
        let end = self.consumed_end();
        self.close_top(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::language::Language;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::syntax::{NodeKind, SyntaxNode};

    fn document(source: &str) -> SyntaxNode {
        let tokens = tokenize(source, Language::Html).unwrap();
        parse(&tokens, Language::Html).unwrap_or_else(|e| panic!("{source:?}: {e}"))
    }

    fn error(source: &str) -> String {
        let tokens = tokenize(source, Language::Html).unwrap();
        parse(&tokens, Language::Html)
            .expect_err("expected a parse error")
            .to_string()
    }

    fn elements(root: &SyntaxNode) -> Vec<&str> {
        root.descendants()
            .filter(|n| n.is(NodeKind::Element))
            .filter_map(|n| n.value())
            .collect()
    }

    #[test]
    fn element_with_attributes_and_text() {
        let root = document("<button type=\"button\" id=x disabled>Go now</button>");
        let button = &root.children[0];

        assert_eq!(button.value(), Some("button"));
        let attributes: Vec<_> = button
            .children_of(NodeKind::Attribute)
            .filter_map(|a| a.value())
            .collect();
        assert_eq!(attributes, ["type", "id", "disabled"]);
        assert_eq!(button.children[1].children[0].kind, NodeKind::Identifier);
        assert!(button.children[2].children.is_empty());

        let text = button.child(NodeKind::Text).unwrap();
        assert_eq!(text.value(), Some("Go now"));
    }

    #[test]
    fn document_level_nodes() {
        let root = document("<!DOCTYPE html>\n<!-- hi -->\n<html><body></body></html>\n");
        let kinds: Vec<_> = root.children.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, [NodeKind::Doctype, NodeKind::Comment, NodeKind::Element]);
        assert_eq!(elements(&root), ["html", "body"]);
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() {
        let root = document("<p>a<br>b<img src=\"x.png\"><span/>c</p>");
        let p = &root.children[0];
        let kinds: Vec<_> = p.children.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            [
                NodeKind::Text,
                NodeKind::Element,
                NodeKind::Text,
                NodeKind::Element,
                NodeKind::Element,
                NodeKind::Text
            ]
        );
    }

    #[test]
    fn optional_end_tags_close_implicitly() {
        let root = document("<ul>\n  <li>one\n  <li>two\n</ul>\n<p>first\n<p>second\n<div></div>");
        let ul = &root.children[0];
        assert_eq!(ul.children_of(NodeKind::Element).count(), 2);

        let top: Vec<_> = root
            .children
            .iter()
            .filter(|n| n.is(NodeKind::Element))
            .filter_map(|n| n.value())
            .collect();
        assert_eq!(top, ["ul", "p", "p", "div"]);
    }

    #[test]
    fn end_tag_closes_unclosed_descendants() {
        let root = document("<div><span>text</div><section></section>");
        assert_eq!(elements(&root), ["div", "span", "section"]);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn script_and_style_bodies_are_raw_text() {
        let root = document("<script>if (a < b) { x(); }</script><style>a > b { }</style>");
        let script = &root.children[0];
        assert_eq!(script.children[0].kind, NodeKind::Text);
        assert_eq!(script.children[0].value(), Some("if (a < b) { x(); }"));
    }

    #[test]
    fn unclosed_elements_end_at_end_of_input() {
        let root = document("<html><body><div>");
        assert_eq!(elements(&root), ["html", "body", "div"]);
    }

    #[test]
    fn element_positions_follow_tokens() {
        let root = document("<div>\n  <span id=\"a\"></span>\n</div>\n");
        let span = root
            .descendants()
            .find(|n| n.value() == Some("span"))
            .unwrap();
        assert_eq!((span.line(), span.column()), (2, 3));
        assert_eq!(root.children[0].span.end_pos.line, 3);
    }

    #[test]
    fn malformed_markup_is_rejected() {
        assert!(error("<div></span>").contains("Unexpected closing tag </span>"));
        assert!(error("<div id=\"a\"").contains("Unterminated tag <div>"));
        assert!(error("<div =\"a\">").contains("Malformed tag <div>"));
        assert!(error("<input value=>").contains("Expected a value for 'value'"));
    }
}
