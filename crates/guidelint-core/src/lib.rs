//! guidelint core - style-guide checks for JavaScript, CSS and HTML
//!
//! The pipeline per file is tokenize, parse, then run every rule that applies
//! to the file's language. [`runner::LintRunner`] drives many files in parallel.

pub mod checker;
pub mod config;
pub mod disable_comments;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod rules;
pub mod runner;
pub mod syntax;
pub mod violation;
pub mod visitor;

pub use checker::{CheckResult, Checker, EngineError, create_default_registry};
pub use config::{Config, ConfigError, ConfigResult, RulesConfig};
pub use language::{Language, detect_language};
pub use parser::ParsedFile;
pub use rules::{Rule, RuleMetadata, RuleRegistry};
pub use runner::{CancellationToken, LintRunner, RunOutcome, SourceFile};
pub use violation::{Severity, Violation};
