//! attribute-order rule (H001): Order attributes `id`, `class`, `data-*`, then
//! everything else
//!
//! Groups are configurable. A trailing `*` makes a group a prefix match and
//! `other` catches attributes no group names.

use serde::Deserialize;

use crate::config::ConfigError;
use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::NodeKind;
use crate::violation::Violation;

const CATCH_ALL: &str = "other";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AttributeOrderOptions {
    pub order: Vec<String>,
}

impl Default for AttributeOrderOptions {
    fn default() -> Self {
        Self {
            order: ["id", "class", "data-*", CATCH_ALL]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Group {
    Exact(String),
    Prefix(String),
    Other,
}

impl Group {
    fn matches(&self, attribute: &str) -> bool {
        match self {
            Group::Exact(name) => attribute == name,
            Group::Prefix(prefix) => attribute.starts_with(prefix.as_str()),
            Group::Other => false,
        }
    }
}

declare_rule!(
    AttributeOrder,
    id = "H001",
    name = "attribute-order",
    description = "Order attributes: id, class, data-*, then the rest",
    languages = [Html],
    severity = Warning,
    options = Vec<Group>,
    examples = "<!-- Bad -->\n<button type=\"button\" id=\"save\" class=\"btn\">Save</button>\n\n<!-- Good -->\n<button id=\"save\" class=\"btn\" type=\"button\">Save</button>"
);

impl AttributeOrder {
    pub fn with_options(options: AttributeOrderOptions) -> Result<Self, ConfigError> {
        let mut groups = Vec::with_capacity(options.order.len() + 1);
        for entry in options.order {
            let entry = entry.trim().to_ascii_lowercase();
            if entry.is_empty() || entry == "*" {
                return Err(ConfigError::invalid_option(
                    "attribute-order",
                    "attribute groups must not be empty",
                ));
            }
            let group = if entry == CATCH_ALL {
                Group::Other
            } else if let Some(prefix) = entry.strip_suffix('*') {
                Group::Prefix(prefix.to_string())
            } else {
                Group::Exact(entry.clone())
            };
            if groups.contains(&group) {
                return Err(ConfigError::invalid_option(
                    "attribute-order",
                    format!("'{entry}' is listed more than once"),
                ));
            }
            groups.push(group);
        }
        if !groups.contains(&Group::Other) {
            groups.push(Group::Other);
        }
        Ok(Self::from_options(groups))
    }

    fn rank(&self, attribute: &str) -> usize {
        let attribute = attribute.to_ascii_lowercase();
        self.options
            .iter()
            .position(|group| group.matches(&attribute))
            .or_else(|| self.options.iter().position(|group| *group == Group::Other))
            .unwrap_or(self.options.len())
    }
}

impl Rule for AttributeOrder {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let mut violations = Vec::new();

        for element in file.root().descendants() {
            if !element.is(NodeKind::Element) {
                continue;
            }
            let attributes: Vec<_> = element
                .children_of(NodeKind::Attribute)
                .filter_map(|a| {
                    let name = a.value()?;
                    Some((a, name, self.rank(name)))
                })
                .collect();

            let misplaced = attributes.iter().enumerate().find_map(|(i, current)| {
                attributes[i + 1..]
                    .iter()
                    .find(|later| later.2 < current.2)
                    .map(|later| (current, later))
            });

            if let Some(((node, name, _), (_, later, _))) = misplaced {
                let end = node.span.end_pos;
                violations.push(
                    self.metadata
                        .violation(
                            file,
                            node.span.start_pos,
                            format!("Attribute '{name}' should come after '{later}'"),
                        )
                        .with_end(end.line, end.column)
                        .with_suggestion(format!("Move '{later}' before '{name}'")),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::parse_html;

    fn run_attribute_order(code: &str) -> Vec<Violation> {
        AttributeOrder::with_options(AttributeOrderOptions::default())
            .unwrap()
            .check(&parse_html(code))
    }

    #[test]
    fn type_before_id_is_reported_once() {
        let violations = run_attribute_order("<button type=\"button\" id=\"x\">Go</button>\n");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, "H001");
        assert_eq!(violations[0].message, "Attribute 'type' should come after 'id'");
        assert_eq!((violations[0].line, violations[0].column), (1, 9));
    }

    #[test]
    fn ordered_attributes_pass() {
        let code = "<a id=\"x\" class=\"y\" data-toggle=\"modal\" data-x=\"1\" href=\"#\" title=\"t\">x</a>\n";
        assert!(run_attribute_order(code).is_empty());
    }

    #[test]
    fn one_violation_per_element() {
        let code = "<div href=\"#\" data-a=\"1\" class=\"c\" id=\"i\"></div>\n<p title=\"t\" class=\"c\">x</p>\n";
        let violations = run_attribute_order(code);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].message, "Attribute 'href' should come after 'data-a'");
        assert_eq!(violations[1].line, 2);
    }

    #[test]
    fn names_compare_case_insensitively() {
        assert!(run_attribute_order("<div ID=\"a\" Class=\"b\" DATA-x=\"c\"></div>").is_empty());
    }

    #[test]
    fn custom_groups() {
        let options = AttributeOrderOptions {
            order: vec!["class".to_string(), "aria-*".to_string(), "other".to_string(), "id".to_string()],
        };
        let rule = AttributeOrder::with_options(options).unwrap();

        assert!(rule
            .check(&parse_html("<div class=\"a\" aria-label=\"b\" title=\"c\" id=\"d\"></div>"))
            .is_empty());
        assert_eq!(
            rule.check(&parse_html("<div id=\"d\" class=\"a\"></div>")).len(),
            1
        );
    }

    #[test]
    fn invalid_groups_are_rejected() {
        let duplicate = AttributeOrderOptions {
            order: vec!["id".to_string(), "ID".to_string()],
        };
        assert!(AttributeOrder::with_options(duplicate).is_err());

        let empty = AttributeOrderOptions {
            order: vec!["*".to_string()],
        };
        assert!(AttributeOrder::with_options(empty).is_err());
    }

    #[test]
    fn metadata_is_correct() {
        let rule = AttributeOrder::with_options(AttributeOrderOptions::default()).unwrap();
        assert_eq!(rule.metadata().id, "H001");
        assert_eq!(rule.metadata().name, "attribute-order");
    }
}
