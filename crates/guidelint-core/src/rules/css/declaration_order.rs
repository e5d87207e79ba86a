//! declaration-order rule (C001): Group declarations by category
//!
//! Properties fall into positioning, box model, typography and everything
//! else. Vendor prefixes are ignored when classifying. Each declaration block
//! is reported at most once, at the first declaration that belongs after a
//! later one.

use serde::Deserialize;

use crate::config::ConfigError;
use crate::declare_rule;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata};
use crate::syntax::NodeKind;
use crate::violation::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Positioning,
    BoxModel,
    Typography,
    Other,
}

impl Category {
    pub const DEFAULT_ORDER: [Category; 4] = [
        Category::Positioning,
        Category::BoxModel,
        Category::Typography,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Positioning => "positioning",
            Category::BoxModel => "box-model",
            Category::Typography => "typography",
            Category::Other => "other",
        }
    }

    pub fn of(property: &str) -> Category {
        let property = property.to_ascii_lowercase();
        if property.starts_with("--") {
            return Category::Other;
        }
        let name = strip_vendor_prefix(&property);

        const POSITIONING: &[&str] = &[
            "position", "top", "right", "bottom", "left", "z-index", "float", "clear",
        ];
        const POSITIONING_PREFIXES: &[&str] = &["inset"];
        const BOX_MODEL: &[&str] = &[
            "display", "box-sizing", "width", "height", "order", "gap", "visibility",
            "aspect-ratio", "vertical-align",
        ];
        const BOX_MODEL_PREFIXES: &[&str] = &[
            "min-", "max-", "margin", "padding", "border", "overflow", "flex", "grid",
            "align-", "justify-", "place-", "row-gap", "column-gap",
        ];
        const TYPOGRAPHY: &[&str] = &[
            "color", "line-height", "letter-spacing", "word-spacing", "white-space",
            "word-break", "word-wrap", "overflow-wrap", "hyphens", "direction",
        ];
        const TYPOGRAPHY_PREFIXES: &[&str] = &["font", "text-", "list-style"];

        let matches = |exact: &[&str], prefixes: &[&str]| {
            exact.contains(&name) || prefixes.iter().any(|prefix| name.starts_with(prefix))
        };

        if matches(POSITIONING, POSITIONING_PREFIXES) {
            Category::Positioning
        } else if matches(TYPOGRAPHY, TYPOGRAPHY_PREFIXES) {
            Category::Typography
        } else if matches(BOX_MODEL, BOX_MODEL_PREFIXES) {
            Category::BoxModel
        } else {
            Category::Other
        }
    }
}

/// `-webkit-box-sizing` classifies like `box-sizing`.
fn strip_vendor_prefix(property: &str) -> &str {
    property
        .strip_prefix('-')
        .and_then(|rest| rest.split_once('-'))
        .map_or(property, |(_, name)| name)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeclarationOrderOptions {
    pub order: Vec<Category>,
}

impl Default for DeclarationOrderOptions {
    fn default() -> Self {
        Self {
            order: Category::DEFAULT_ORDER.to_vec(),
        }
    }
}

declare_rule!(
    DeclarationOrder,
    id = "C001",
    name = "declaration-order",
    description = "Order declarations: positioning, box model, typography, then the rest",
    languages = [Css],
    severity = Warning,
    options = Vec<Category>,
    examples = "/* Bad */\n.box {\n  color: red;\n  position: absolute;\n}\n\n/* Good */\n.box {\n  position: absolute;\n  color: red;\n}"
);

impl DeclarationOrder {
    /// Categories missing from `order` keep their default relative order
    /// after the listed ones.
    pub fn with_options(options: DeclarationOrderOptions) -> Result<Self, ConfigError> {
        let mut order = Vec::with_capacity(Category::DEFAULT_ORDER.len());
        for category in options.order {
            if order.contains(&category) {
                return Err(ConfigError::invalid_option(
                    "declaration-order",
                    format!("category '{}' is listed more than once", category.name()),
                ));
            }
            order.push(category);
        }
        for category in Category::DEFAULT_ORDER {
            if !order.contains(&category) {
                order.push(category);
            }
        }
        Ok(Self::from_options(order))
    }

    fn rank(&self, category: Category) -> usize {
        self.options
            .iter()
            .position(|c| *c == category)
            .unwrap_or(self.options.len())
    }
}

impl Rule for DeclarationOrder {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Violation> {
        let mut violations = Vec::new();

        for block in file.root().descendants() {
            if !block.is(NodeKind::DeclarationBlock) {
                continue;
            }
            let declarations: Vec<_> = block
                .children_of(NodeKind::Declaration)
                .filter_map(|d| {
                    let property = d.value()?;
                    Some((d, property, Category::of(property)))
                })
                .collect();

            let misplaced = declarations.iter().enumerate().find_map(|(i, current)| {
                declarations[i + 1..]
                    .iter()
                    .find(|later| self.rank(later.2) < self.rank(current.2))
                    .map(|later| (current, later))
            });

            if let Some(((node, property, category), (_, later, later_category))) = misplaced {
                violations.push(
                    self.metadata
                        .violation(
                            file,
                            node.span.start_pos,
                            format!(
                                "'{property}' ({}) should come after '{later}' ({})",
                                category.name(),
                                later_category.name()
                            ),
                        )
                        .with_suggestion(format!(
                            "Move {} declarations before {} declarations",
                            later_category.name(),
                            category.name()
                        )),
                );
            }
        }

        violations
    }
}
