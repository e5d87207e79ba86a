//! Report rendering for lint results

pub mod json;
pub mod text;

use std::io::{self, Write};

use clap::ValueEnum;
use guidelint_core::{CheckResult, RuleRegistry, Severity};
use serde::Serialize;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Overall outcome of a run; `Pass` iff every file passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pass,
    Fail,
}

impl RunStatus {
    pub fn of(results: &[CheckResult]) -> Self {
        if results.iter().all(|r| r.passed) {
            RunStatus::Pass
        } else {
            RunStatus::Fail
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Pass => 0,
            RunStatus::Fail => 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub hint: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub files_with_issues: usize,
    pub total_violations: usize,
    pub by_severity: SeverityCounts,
}

impl Summary {
    pub fn of(results: &[CheckResult]) -> Self {
        let mut by_severity = SeverityCounts::default();
        for violation in results.iter().flat_map(|r| &r.violations) {
            match violation.severity {
                Severity::Error => by_severity.error += 1,
                Severity::Warning => by_severity.warning += 1,
                Severity::Info => by_severity.info += 1,
                Severity::Hint => by_severity.hint += 1,
            }
        }

        Self {
            total_files: results.len(),
            files_with_issues: results.iter().filter(|r| !r.passed).count(),
            total_violations: results.iter().map(|r| r.violations.len()).sum(),
            by_severity,
        }
    }
}

/// Write `results` to `sink` in `format` and return the run status.
pub fn report<W: Write>(
    results: &[CheckResult],
    format: OutputFormat,
    registry: &RuleRegistry,
    sink: &mut W,
) -> io::Result<RunStatus> {
    match format {
        OutputFormat::Text => text::write_report(results, sink)?,
        OutputFormat::Json => json::JsonFormatter::with_registry(registry).write(results, sink)?,
    }
    sink.flush()?;
    Ok(RunStatus::of(results))
}
