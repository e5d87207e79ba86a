//! Inline disable comment directives for suppressing violations
//!
//! Recognized in JavaScript (`//`, `/* */`), CSS (`/* */`) and HTML
//! (`<!-- -->`) comments:
//! - `guidelint-disable-next-line J003` - disable J003 for the next line
//! - `guidelint-disable-line quote-style` - disable a rule, by id or name, for the current line
//! - `guidelint-disable-next-line` - disable all rules for the next line
//! - `guidelint-disable-next-line J003, J006` - disable multiple rules

use std::collections::HashMap;

use crate::lexer::{Token, TokenKind};
use crate::rules::refers_to;

const DISABLE_NEXT_LINE: &str = "guidelint-disable-next-line";
const DISABLE_LINE: &str = "guidelint-disable-line";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableDirective {
    pub line: usize,
    /// Rule ids or names; empty means every rule.
    pub rules: Vec<String>,
}

impl DisableDirective {
    pub fn new(line: usize, rules: Vec<String>) -> Self {
        Self { line, rules }
    }

    pub fn disables_all(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn disables_rule(&self, rule_id: &str, rule_name: &str) -> bool {
        self.rules.is_empty()
            || self
                .rules
                .iter()
                .any(|rule| refers_to(rule, rule_id, rule_name))
    }

    fn merge(&mut self, other: DisableDirective) {
        if self.disables_all() || other.disables_all() {
            self.rules.clear();
        } else {
            self.rules.extend(other.rules);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisableDirectives {
    by_line: HashMap<usize, DisableDirective>,
}

impl DisableDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut directives = Self::new();

        for token in tokens.iter().filter(|t| t.kind == TokenKind::Comment) {
            let body = comment_body(&token.text);
            let directive = if let Some(rest) = body.strip_prefix(DISABLE_NEXT_LINE) {
                parse_rule_refs(rest)
                    .map(|rules| DisableDirective::new(token.span.end_pos.line + 1, rules))
            } else if let Some(rest) = body.strip_prefix(DISABLE_LINE) {
                parse_rule_refs(rest).map(|rules| DisableDirective::new(token.line(), rules))
            } else {
                None
            };
            if let Some(directive) = directive {
                directives.add(directive);
            }
        }

        directives
    }

    pub fn add(&mut self, directive: DisableDirective) {
        match self.by_line.get_mut(&directive.line) {
            Some(existing) => existing.merge(directive),
            None => {
                self.by_line.insert(directive.line, directive);
            }
        }
    }

    pub fn is_disabled(&self, line: usize, rule_id: &str, rule_name: &str) -> bool {
        self.by_line
            .get(&line)
            .is_some_and(|d| d.disables_rule(rule_id, rule_name))
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_line.len()
    }
}

/// Text of a comment without its delimiters.
fn comment_body(text: &str) -> &str {
    let body = if let Some(rest) = text.strip_prefix("//") {
        rest
    } else if let Some(rest) = text.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else if let Some(rest) = text.strip_prefix("<!--") {
        rest.strip_suffix("-->").unwrap_or(rest)
    } else {
        text
    };
    body.trim()
}

/// Comma separated rule references; `None` when the keyword runs into other
/// text, as in `guidelint-disable-lines`.
fn parse_rule_refs(rest: &str) -> Option<Vec<String>> {
    if rest.starts_with(|c: char| !c.is_whitespace()) {
        return None;
    }

    Some(
        rest.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}
