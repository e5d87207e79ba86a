//! naming-convention rule (J005): camelCase for variables and functions,
//! PascalCase for constructors and classes
//!
//! `const` bindings may also use UPPER_SNAKE_CASE. Function names and bindings
//! initialised with a function or class expression may use the constructor
//! pattern. Destructuring patterns are not inspected.

use regex::Regex;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::violation::Violation;

pub const DEFAULT_VARIABLE_PATTERN: &str = r"^[a-z_$][a-zA-Z0-9_$]*$";
pub const DEFAULT_CONSTANT_PATTERN: &str = r"^[A-Z][A-Z0-9_]*$";
pub const DEFAULT_CONSTRUCTOR_PATTERN: &str = r"^[A-Z][a-zA-Z0-9]*$";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NamingConventionOptions {
    pub variable: String,
    pub constant: String,
    pub constructor: String,
}

impl Default for NamingConventionOptions {
    fn default() -> Self {
        Self {
            variable: DEFAULT_VARIABLE_PATTERN.to_string(),
            constant: DEFAULT_CONSTANT_PATTERN.to_string(),
            constructor: DEFAULT_CONSTRUCTOR_PATTERN.to_string(),
        }
    }
}

struct NamingPatterns {
    variable: Regex,
    constant: Regex,
    constructor: Regex,
}

declare_rule!(
    NamingConvention,
    id = "J005",
    name = "naming-convention",
    description = "Use camelCase for variables and functions, PascalCase for constructors",
    languages = [JavaScript],
    severity = Warning,
    options = NamingPatterns,
    examples = "// Bad\nvar this_is_my_object = {};\nfunction c() {}\nvar u = new user();\n\n// Good\nvar thisIsMyObject = {};\nfunction query() {}\nvar user = new User();"
);

impl NamingConvention {
    pub fn with_options(options: NamingConventionOptions) -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ConfigError::invalid_option("naming-convention", format!("'{pattern}': {e}"))
            })
        };

        Ok(Self::from_options(NamingPatterns {
            variable: compile(&options.variable)?,
            constant: compile(&options.constant)?,
            constructor: compile(&options.constructor)?,
        }))
    }

    fn report(&self, file: &ParsedFile, name: &SyntaxNode, kind: &str, expected: &Regex) -> Violation {
        let value = name.value().unwrap_or_default();
        let end = name.span.end_pos;
        self.metadata
            .violation(
                file,
                name.span.start_pos,
                format!("{kind} name '{value}' does not match /{}/", expected.as_str()),
            )
            .with_end(end.line, end.column)
    }

    fn check_declaration(&self, file: &ParsedFile, node: &SyntaxNode, out: &mut Vec<Violation>) {
        let is_const = node.value() == Some("const");
        for declarator in node.children_of(NodeKind::VariableDeclarator) {
            let Some(name) = declarator
                .children
                .first()
                .filter(|target| target.is(NodeKind::Identifier))
            else {
                continue;
            };
            let Some(value) = name.value() else {
                continue;
            };
            let patterns = &self.options;
            let builds_object = declarator.children.get(1).is_some_and(|init| {
                matches!(
                    init.kind,
                    NodeKind::FunctionExpression | NodeKind::ClassExpression
                )
            });

            if patterns.variable.is_match(value)
                || (is_const && patterns.constant.is_match(value))
                || (builds_object && patterns.constructor.is_match(value))
            {
                continue;
            }
            out.push(self.report(file, name, "Variable", &patterns.variable));
        }
    }

    fn check_parameters(&self, file: &ParsedFile, node: &SyntaxNode, out: &mut Vec<Violation>) {
        for param in &node.children {
            let name = match param.kind {
                NodeKind::Identifier => Some(param),
                NodeKind::AssignmentExpression | NodeKind::SpreadElement => param
                    .children
                    .first()
                    .filter(|target| target.is(NodeKind::Identifier)),
                _ => None,
            };
            let Some(name) = name else {
                continue;
            };
            if !self.options.variable.is_match(name.value().unwrap_or_default()) {
                out.push(self.report(file, name, "Parameter", &self.options.variable));
            }
        }
    }

    fn check_named(
        &self,
        file: &ParsedFile,
        name: Option<&SyntaxNode>,
        kind: &str,
        allowed: &[&Regex],
        out: &mut Vec<Violation>,
    ) {
        let Some(name) = name.filter(|n| n.is(NodeKind::Identifier)) else {
            return;
        };
        let value = name.value().unwrap_or_default();
        if allowed.iter().any(|pattern| pattern.is_match(value)) {
            return;
        }
        if let Some(expected) = allowed.last() {
            out.push(self.report(file, name, kind, expected));
        }
    }
}

/// Name leaf of a function or class; anonymous ones carry no value.
fn declared_name(node: &SyntaxNode) -> Option<&SyntaxNode> {
    node.value().and(node.children.first())
}

impl Rule for NamingConvention {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let patterns = &self.options;
        let mut violations = Vec::new();

        for node in file.root().descendants() {
            match node.kind {
                NodeKind::VariableDeclaration => {
                    self.check_declaration(file, node, &mut violations);
                }
                NodeKind::Parameters => self.check_parameters(file, node, &mut violations),
                NodeKind::CatchClause => {
                    let param = node.children.first().filter(|p| p.is(NodeKind::Identifier));
                    self.check_named(file, param, "Parameter", &[&patterns.variable], &mut violations);
                }
                NodeKind::FunctionDeclaration | NodeKind::FunctionExpression => {
                    self.check_named(
                        file,
                        declared_name(node),
                        "Function",
                        &[&patterns.constructor, &patterns.variable],
                        &mut violations,
                    );
                }
                NodeKind::ClassDeclaration | NodeKind::ClassExpression => {
                    self.check_named(
                        file,
                        declared_name(node),
                        "Class",
                        &[&patterns.constructor],
                        &mut violations,
                    );
                }
                NodeKind::NewExpression => {
                    self.check_named(
                        file,
                        node.children.first(),
                        "Constructor",
                        &[&patterns.constructor],
                        &mut violations,
                    );
                }
                _ => {}
            }
        }

        violations
    }
}
