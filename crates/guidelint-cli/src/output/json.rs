//! JSON output formatter for programmatic integration

use std::io::{self, Write};

use guidelint_core::{CheckResult, Language, RuleRegistry, Violation};
use serde::Serialize;

use super::Summary;

#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub version: &'static str,
    pub summary: Summary,
    pub results: Vec<JsonResult<'a>>,
}

#[derive(Serialize)]
pub struct JsonResult<'a> {
    pub path: &'a str,
    pub language: Language,
    pub passed: bool,
    pub violations: Vec<JsonViolation<'a>>,
}

#[derive(Serialize)]
pub struct JsonViolation<'a> {
    #[serde(flatten)]
    pub violation: &'a Violation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<&'static str>,
}

pub struct JsonFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> JsonFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(&self, results: &[CheckResult]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.build_output(results))
    }

    pub fn write<W: Write>(&self, results: &[CheckResult], writer: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &self.build_output(results))?;
        writeln!(writer)
    }

    fn build_output<'r>(&self, results: &'r [CheckResult]) -> JsonOutput<'r> {
        JsonOutput {
            version: env!("CARGO_PKG_VERSION"),
            summary: Summary::of(results),
            results: results
                .iter()
                .map(|result| JsonResult {
                    path: &result.path,
                    language: result.language,
                    passed: result.passed,
                    violations: result
                        .violations
                        .iter()
                        .map(|violation| JsonViolation {
                            violation,
                            rule_name: self.rule_name(&violation.rule_id),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn rule_name(&self, rule_id: &str) -> Option<&'static str> {
        self.registry
            .and_then(|registry| registry.get_rule(rule_id))
            .map(|rule| rule.metadata().name)
    }
}

impl Default for JsonFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
