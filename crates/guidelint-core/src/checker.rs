//! Checker that applies the registered rules to one file
//!
//! Rule faults are isolated: a rule that panics becomes a single
//! `rule-execution-error` violation and the remaining rules still run.
//! Parsing and rule visitors recurse with the file's nesting, so whole-file
//! checks run on a thread with [`PIPELINE_STACK_SIZE`] of stack.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ConfigError, RulesConfig};
use crate::language::Language;
use crate::lexer::Position;
use crate::parser::{ParsedFile, SourceError};
use crate::rules::{Rule, RuleConflictError, RuleRegistry, builtin_rules};
use crate::violation::{LEX_ERROR, PARSE_ERROR, RULE_EXECUTION_ERROR, Severity, Violation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub path: String,
    pub language: Language,
    pub violations: Vec<Violation>,
    pub passed: bool,
}

impl CheckResult {
    pub fn new(path: impl Into<String>, language: Language, violations: Vec<Violation>) -> Self {
        let passed = violations.is_empty();
        Self {
            path: path.into(),
            language,
            violations,
            passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rule {rule_id} ({rule_name}) failed: {message}")]
pub struct RuleExecutionError {
    pub rule_id: String,
    pub rule_name: String,
    pub message: String,
}

impl RuleExecutionError {
    fn from_panic(rule: &dyn Rule, payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "rule panicked".to_string());
        Self {
            rule_id: rule.metadata().id.to_string(),
            rule_name: rule.metadata().name.to_string(),
            message,
        }
    }

    pub fn into_violation(self, file: &ParsedFile) -> Violation {
        let at = file
            .tokens()
            .first()
            .map_or(Position::START, |token| token.span.start_pos);
        Violation::new(
            RULE_EXECUTION_ERROR,
            Severity::Error,
            self.to_string(),
            file.path(),
            at.line,
            at.column,
        )
    }
}

/// Stack reserved for threads that parse and check files.
pub const PIPELINE_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Start-up failures that prevent any file from being checked.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    RuleConflict(#[from] RuleConflictError),
}

/// Registry holding every built-in rule, configured by `config`.
pub fn create_default_registry(config: &RulesConfig) -> Result<RuleRegistry, EngineError> {
    let mut registry = RuleRegistry::new();
    for rule in builtin_rules(config)? {
        registry.register(rule)?;
    }
    registry.configure(config);
    Ok(registry)
}

pub struct Checker {
    registry: RuleRegistry,
}

impl Checker {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn with_config(config: &RulesConfig) -> Result<Self, EngineError> {
        Ok(Self::new(create_default_registry(config)?))
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn check(&self, file: &ParsedFile) -> CheckResult {
        let directives = file.disable_directives();
        let mut violations = Vec::new();

        for rule in self.registry.rules_for(file.language()) {
            let metadata = rule.metadata();
            match panic::catch_unwind(AssertUnwindSafe(|| rule.check(file))) {
                Ok(mut found) => {
                    self.registry.apply_severity_overrides(rule, &mut found);
                    violations.extend(found.into_iter().filter(|v| {
                        !directives.is_disabled(v.line, metadata.id, metadata.name)
                    }));
                }
                Err(payload) => {
                    let error = RuleExecutionError::from_panic(rule, payload);
                    warn!(path = file.path(), rule = metadata.id, "{}", error);
                    violations.push(error.into_violation(file));
                }
            }
        }

        violations.sort_by_key(|v| (v.line, v.column));
        debug!(
            path = file.path(),
            violations = violations.len(),
            "checked file"
        );
        CheckResult::new(file.path(), file.language(), violations)
    }

    /// Tokenize, parse and check `source`. A file that cannot be parsed
    /// yields one `lex-error` or `parse-error` violation and no rule output.
    pub fn check_source(&self, path: &str, source: &str, language: Language) -> CheckResult {
        let spawned = thread::scope(|scope| {
            thread::Builder::new()
                .name("guidelint-check".to_string())
                .stack_size(PIPELINE_STACK_SIZE)
                .spawn_scoped(scope, || self.check_source_in_place(path, source, language))
                .map(|handle| handle.join())
        });

        match spawned {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(error) => {
                warn!(path, "could not spawn checker thread: {}", error);
                self.check_source_in_place(path, source, language)
            }
        }
    }

    /// [`Checker::check_source`] on the calling thread, which must have
    /// [`PIPELINE_STACK_SIZE`] of stack for deeply nested files.
    pub(crate) fn check_source_in_place(
        &self,
        path: &str,
        source: &str,
        language: Language,
    ) -> CheckResult {
        match ParsedFile::parse(path, source, language) {
            Ok(file) => self.check(&file),
            Err(error) => {
                debug!(path, "{}", error);
                let rule_id = match error {
                    SourceError::Lex(_) => LEX_ERROR,
                    SourceError::Parse(_) => PARSE_ERROR,
                };
                let violation = Violation::new(
                    rule_id,
                    Severity::Error,
                    error.message(),
                    path,
                    error.line(),
                    error.column(),
                );
                CheckResult::new(path, language, vec![violation])
            }
        }
    }
}
