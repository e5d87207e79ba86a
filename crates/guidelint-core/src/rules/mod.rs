//! Rule system for style checking
//!
//! Rules are independent values in one flat table. Each rule declares the
//! languages it applies to and never sees another rule's output.

pub mod css;
pub mod general;
pub mod helpers;
pub mod html;
pub mod javascript;

use std::collections::{HashMap, HashSet};

use crate::config::{ConfigError, RulesConfig};
use crate::language::Language;
use crate::lexer::Position;
use crate::parser::ParsedFile;
use crate::violation::{Severity, Violation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub languages: &'static [Language],
    pub severity: Severity,
    pub examples: Option<&'static str>,
}

impl RuleMetadata {
    pub fn is_referenced_by(&self, rule_ref: &str) -> bool {
        refers_to(rule_ref, self.id, self.name)
    }

    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    /// A violation of this rule at `at`, with the rule's default severity.
    pub fn violation(&self, file: &ParsedFile, at: Position, message: impl Into<String>) -> Violation {
        Violation::new(self.id, self.severity, message, file.path(), at.line, at.column)
    }
}

/// Whether a rule reference from config or a comment names the rule with
/// `id` and `name`. Ids match in any case, names exactly.
pub fn refers_to(rule_ref: &str, id: &str, name: &str) -> bool {
    rule_ref.eq_ignore_ascii_case(id) || rule_ref == name
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, file: &ParsedFile) -> Vec<Violation>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleConflictError {
    #[error("rule id '{0}' is already registered")]
    DuplicateId(String),
    #[error("rule name '{0}' is already registered")]
    DuplicateName(String),
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    /// Canonical ids of disabled rules.
    disabled_rules: HashSet<&'static str>,
    /// Severity overrides keyed by canonical id.
    severity_overrides: HashMap<&'static str, Severity>,
    disabled_languages: HashSet<Language>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
            disabled_languages: HashSet::new(),
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RuleConflictError> {
        let metadata = rule.metadata();
        if self.get_rule(metadata.id).is_some() {
            return Err(RuleConflictError::DuplicateId(metadata.id.to_string()));
        }
        if self.get_rule_by_name(metadata.name).is_some() {
            return Err(RuleConflictError::DuplicateName(metadata.name.to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();
        self.disabled_languages.clear();

        for rule_ref in &config.disabled {
            if let Some(rule) = self.find(rule_ref) {
                self.disabled_rules.insert(rule.metadata().id);
            }
        }

        // An override given by id wins over one given by name.
        let mut by_id = HashSet::new();
        for (rule_ref, severity) in &config.severity {
            let Some(rule) = self.find(rule_ref) else {
                continue;
            };
            let id = rule.metadata().id;
            let is_id = rule_ref.eq_ignore_ascii_case(id);
            if is_id || !by_id.contains(id) {
                self.severity_overrides.insert(id, *severity);
            }
            if is_id {
                by_id.insert(id);
            }
        }

        for language in Language::ALL {
            if !config.language_enabled(language) {
                self.disabled_languages.insert(language);
            }
        }
    }

    /// Every registered rule, enabled or not, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Enabled rules that apply to `language`, in registration order.
    pub fn rules_for(&self, language: Language) -> impl Iterator<Item = &dyn Rule> {
        let language_enabled = !self.disabled_languages.contains(&language);
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(move |rule| {
                language_enabled
                    && rule.metadata().applies_to(language)
                    && !self.is_rule_disabled(rule.metadata())
            })
    }

    fn is_rule_disabled(&self, metadata: &RuleMetadata) -> bool {
        self.disabled_rules.contains(metadata.id)
    }

    pub fn severity_for(&self, metadata: &RuleMetadata) -> Severity {
        self.severity_overrides
            .get(metadata.id)
            .copied()
            .unwrap_or(metadata.severity)
    }

    pub fn apply_severity_overrides(&self, rule: &dyn Rule, violations: &mut [Violation]) {
        let metadata = rule.metadata();
        if let Some(severity) = self.severity_overrides.get(metadata.id) {
            for violation in violations.iter_mut() {
                violation.severity = *severity;
            }
        }
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        self.find(id_or_name).is_some_and(|rule| {
            let metadata = rule.metadata();
            !self.is_rule_disabled(metadata)
                && metadata
                    .languages
                    .iter()
                    .any(|language| !self.disabled_languages.contains(language))
        })
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().id == id)
            .map(|r| r.as_ref())
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().name == name)
            .map(|r| r.as_ref())
    }

    /// Look a rule up by id (case-insensitive) or by name.
    pub fn find(&self, id_or_name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().is_referenced_by(id_or_name))
            .map(|r| r.as_ref())
    }

    /// Rule references in `config` that match no registered rule.
    pub fn unknown_references(&self, config: &RulesConfig) -> Vec<String> {
        let mut unknown = Vec::new();
        let sections = [
            ("disabled", config.disabled.iter().collect::<Vec<_>>()),
            ("severity", config.severity.keys().collect()),
            ("options", config.options.keys().collect()),
        ];
        for (section, refs) in sections {
            let mut refs = refs;
            refs.sort();
            for rule_ref in refs {
                if self.find(rule_ref).is_none() {
                    unknown.push(format!("Unknown rule '{rule_ref}' in [rules.{section}]"));
                }
            }
        }
        unknown
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Every built-in rule, with options taken from `config`.
pub fn builtin_rules(config: &RulesConfig) -> Result<Vec<Box<dyn Rule>>, ConfigError> {
    use self::css::{CssIndent, DeclarationOrder};
    use self::general::TrailingNewline;
    use self::html::{AttributeOrder, AttributeQuotes, HtmlIndent};
    use self::javascript::{
        BraceStyle, CommaStyle, Eqeqeq, Indent, LiteralConstruction, NamingConvention, QuoteStyle,
        Semi,
    };

    Ok(vec![
        Box::new(LiteralConstruction::new()),
        Box::new(QuoteStyle::with_options(
            config.options_for("J002", "quote-style")?,
        )),
        Box::new(Eqeqeq::with_options(config.options_for("J003", "eqeqeq")?)),
        Box::new(BraceStyle::new()),
        Box::new(NamingConvention::with_options(
            config.options_for("J005", "naming-convention")?,
        )?),
        Box::new(Semi::new()),
        Box::new(CommaStyle::new()),
        Box::new(Indent::with_options(config.options_for("J008", "indent")?)?),
        Box::new(DeclarationOrder::with_options(
            config.options_for("C001", "declaration-order")?,
        )?),
        Box::new(CssIndent::with_options(
            config.options_for("C002", "css-indent")?,
        )?),
        Box::new(AttributeOrder::with_options(
            config.options_for("H001", "attribute-order")?,
        )?),
        Box::new(AttributeQuotes::new()),
        Box::new(HtmlIndent::with_options(
            config.options_for("H003", "html-indent")?,
        )?),
        Box::new(TrailingNewline::new()),
    ])
}

/// Declare a rule struct and its metadata.
///
/// With `options = T` the struct also carries a `T` and the rule module
/// provides its own constructor through `from_options`.
#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        id = $id:literal,
        name = $rule_name:literal,
        description = $desc:literal,
        languages = [$($lang:ident),+ $(,)?],
        severity = $sev:ident
        $(, options = $opts:ty)?
        $(, examples = $examples:literal)?
    ) => {
        $crate::declare_rule!(@define $name $(, $opts)?);

        impl $name {
            fn default_metadata() -> $crate::rules::RuleMetadata {
                $crate::rules::RuleMetadata {
                    id: $id,
                    name: $rule_name,
                    description: $desc,
                    languages: &[$($crate::language::Language::$lang),+],
                    severity: $crate::violation::Severity::$sev,
                    examples: $crate::declare_rule!(@examples $($examples)?),
                }
            }
        }
    };
    (@define $name:ident) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    metadata: Self::default_metadata(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@define $name:ident, $opts:ty) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
            options: $opts,
        }

        impl $name {
            fn from_options(options: $opts) -> Self {
                Self {
                    metadata: Self::default_metadata(),
                    options,
                }
            }
        }
    };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::parse_js;

    struct TestRule {
        metadata: RuleMetadata,
        violations_to_return: Vec<Violation>,
    }

    impl TestRule {
        fn new(id: &'static str) -> Self {
            Self {
                metadata: RuleMetadata {
                    id,
                    name: "test-rule",
                    description: "A test rule",
                    languages: &[Language::JavaScript],
                    severity: Severity::Warning,
                    examples: None,
                },
                violations_to_return: Vec::new(),
            }
        }

        fn with_name(mut self, name: &'static str) -> Self {
            self.metadata.name = name;
            self
        }

        fn with_languages(mut self, languages: &'static [Language]) -> Self {
            self.metadata.languages = languages;
            self
        }

        fn with_violation(mut self, violation: Violation) -> Self {
            self.violations_to_return.push(violation);
            self
        }
    }

    impl Rule for TestRule {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn check(&self, _file: &ParsedFile) -> Vec<Violation> {
            self.violations_to_return.clone()
        }
    }

    fn ids<'a>(rules: impl Iterator<Item = &'a dyn Rule>) -> Vec<&'static str> {
        rules.map(|r| r.metadata().id).collect()
    }

    #[test]
    fn registry_keeps_registration_order() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T002").with_name("b"))).unwrap();
        registry.register(Box::new(TestRule::new("T001").with_name("a"))).unwrap();
        registry.register(Box::new(TestRule::new("T003").with_name("c"))).unwrap();

        assert_eq!(ids(registry.rules()), ["T002", "T001", "T003"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("a"))).unwrap();

        let err = registry
            .register(Box::new(TestRule::new("T001").with_name("b")))
            .unwrap_err();

        assert_eq!(err, RuleConflictError::DuplicateId("T001".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001"))).unwrap();

        let err = registry.register(Box::new(TestRule::new("T002"))).unwrap_err();

        assert_eq!(err, RuleConflictError::DuplicateName("test-rule".to_string()));
        assert_eq!(err.to_string(), "rule name 'test-rule' is already registered");
    }

    #[test]
    fn rules_for_filters_by_language() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("J1").with_name("j"))).unwrap();
        registry
            .register(Box::new(
                TestRule::new("C1").with_name("c").with_languages(&[Language::Css]),
            ))
            .unwrap();
        registry
            .register(Box::new(
                TestRule::new("A1").with_name("a").with_languages(&Language::ALL),
            ))
            .unwrap();

        assert_eq!(ids(registry.rules_for(Language::JavaScript)), ["J1", "A1"]);
        assert_eq!(ids(registry.rules_for(Language::Css)), ["C1", "A1"]);
        assert_eq!(ids(registry.rules_for(Language::Html)), ["A1"]);
    }

    #[test]
    fn configure_disables_by_id_or_name() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("a"))).unwrap();
        registry.register(Box::new(TestRule::new("T002").with_name("b"))).unwrap();
        registry.register(Box::new(TestRule::new("T003").with_name("c"))).unwrap();

        let config = RulesConfig {
            disabled: vec!["T001".to_string(), "c".to_string()],
            ..Default::default()
        };
        registry.configure(&config);

        assert_eq!(ids(registry.rules_for(Language::JavaScript)), ["T002"]);
        assert!(!registry.is_rule_enabled("a"));
        assert!(registry.is_rule_enabled("T002"));
        assert!(!registry.is_rule_enabled("missing"));
    }

    #[test]
    fn configure_toggles_languages() {
        let mut registry = RuleRegistry::new();
        registry
            .register(Box::new(
                TestRule::new("A1").with_name("a").with_languages(&Language::ALL),
            ))
            .unwrap();

        let config = RulesConfig {
            javascript: Some(false),
            ..Default::default()
        };
        registry.configure(&config);

        assert_eq!(registry.rules_for(Language::JavaScript).count(), 0);
        assert_eq!(registry.rules_for(Language::Css).count(), 1);
        assert!(registry.is_rule_enabled("A1"));
    }

    #[test]
    fn severity_overrides_apply_by_id_or_name() {
        let mut registry = RuleRegistry::new();
        let rule = TestRule::new("T001")
            .with_name("a")
            .with_violation(Violation::new("T001", Severity::Warning, "m", "a.js", 1, 1));
        registry.register(Box::new(rule)).unwrap();

        let config = RulesConfig {
            severity: HashMap::from([("a".to_string(), Severity::Error)]),
            ..Default::default()
        };
        registry.configure(&config);

        let rule = registry.get_rule("T001").unwrap();
        let mut violations = rule.check(&parse_js("x;"));
        registry.apply_severity_overrides(rule, &mut violations);

        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(registry.severity_for(rule.metadata()), Severity::Error);
    }

    #[test]
    fn find_accepts_lowercase_ids_and_names() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("a"))).unwrap();

        assert!(registry.find("t001").is_some());
        assert!(registry.find("a").is_some());
        assert!(registry.find("zzz").is_none());
    }

    #[test]
    fn configure_resolves_lowercase_ids() {
        let mut registry = RuleRegistry::new();
        let rule = TestRule::new("T001")
            .with_name("a")
            .with_violation(Violation::new("T001", Severity::Warning, "m", "a.js", 1, 1));
        registry.register(Box::new(rule)).unwrap();
        registry.register(Box::new(TestRule::new("T002").with_name("b"))).unwrap();

        let config = RulesConfig {
            disabled: vec!["t002".to_string()],
            severity: HashMap::from([("t001".to_string(), Severity::Hint)]),
            ..Default::default()
        };
        registry.configure(&config);

        assert!(registry.unknown_references(&config).is_empty());
        assert_eq!(ids(registry.rules_for(Language::JavaScript)), ["T001"]);
        assert!(!registry.is_rule_enabled("T002"));

        let rule = registry.get_rule("T001").unwrap();
        let mut violations = rule.check(&parse_js("x;"));
        registry.apply_severity_overrides(rule, &mut violations);
        assert_eq!(violations[0].severity, Severity::Hint);
    }

    #[test]
    fn severity_by_id_wins_over_name() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("a"))).unwrap();

        let config = RulesConfig {
            severity: HashMap::from([
                ("a".to_string(), Severity::Info),
                ("T001".to_string(), Severity::Error),
            ]),
            ..Default::default()
        };
        registry.configure(&config);

        let rule = registry.get_rule("T001").unwrap();
        assert_eq!(registry.severity_for(rule.metadata()), Severity::Error);
    }

    #[test]
    fn unknown_references_are_listed() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("a"))).unwrap();

        let config = RulesConfig {
            disabled: vec!["a".to_string(), "nope".to_string()],
            severity: HashMap::from([("T999".to_string(), Severity::Info)]),
            ..Default::default()
        };

        assert_eq!(
            registry.unknown_references(&config),
            [
                "Unknown rule 'nope' in [rules.disabled]",
                "Unknown rule 'T999' in [rules.severity]"
            ]
        );
    }

    #[test]
    fn builtin_rules_have_unique_ids_and_names() {
        let rules = builtin_rules(&RulesConfig::default()).unwrap();
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule).unwrap();
        }

        assert_eq!(registry.len(), 14);
        for rule in registry.rules() {
            let metadata = rule.metadata();
            assert!(!metadata.languages.is_empty(), "{}", metadata.id);
            assert!(!metadata.description.is_empty(), "{}", metadata.id);
        }
    }

    #[test]
    fn builtin_rules_reject_invalid_options() {
        let mut config = RulesConfig::default();
        config.options.insert(
            "naming-convention".to_string(),
            "variable = \"([\"".parse().unwrap(),
        );

        let err = builtin_rules(&config).err().unwrap();

        assert!(matches!(err, ConfigError::InvalidOption { ref rule, .. } if rule == "naming-convention"));
    }
}
