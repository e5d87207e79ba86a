//! Plain text output, one line per violation

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use guidelint_core::{CheckResult, Severity, Violation};

use super::Summary;

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
        Severity::Hint => "hint".cyan().bold(),
    }
}

pub fn write_violation<W: Write>(violation: &Violation, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "{}:{}:{}: {} [{}]: {}",
        violation.file,
        violation.line,
        violation.column,
        severity_label(violation.severity),
        violation.rule_id.dimmed(),
        violation.message
    )?;
    if let Some(suggestion) = &violation.suggestion {
        writeln!(writer, "  {} {}", "suggestion:".green(), suggestion)?;
    }
    Ok(())
}

pub fn write_report<W: Write>(results: &[CheckResult], writer: &mut W) -> io::Result<()> {
    for violation in results.iter().flat_map(|r| &r.violations) {
        write_violation(violation, writer)?;
    }

    let summary = Summary::of(results);
    if summary.total_violations == 0 {
        writeln!(
            writer,
            "{} No violations in {} file(s)",
            "✓".green().bold(),
            summary.total_files
        )?;
        return Ok(());
    }

    let counts = summary.by_severity;
    writeln!(writer)?;
    writeln!(
        writer,
        "Found {} error(s), {} warning(s), {} info and {} hint(s) in {} of {} file(s)",
        counts.error,
        counts.warning,
        counts.info,
        counts.hint,
        summary.files_with_issues,
        summary.total_files
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_results;

    fn render(results: &[CheckResult]) -> String {
        colored::control::set_override(false);
        let mut sink = Vec::new();
        write_report(results, &mut sink).unwrap();
        String::from_utf8(sink).unwrap()
    }

    #[test]
    fn violation_lines_use_compiler_style_locations() {
        let output = render(&sample_results());
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(
            lines[0],
            "src/app.js:1:12: warning [J001]: Use the literal '{}' instead of 'new Object()'"
        );
        assert_eq!(lines[1], "  suggestion: Replace with '{}'");
        assert_eq!(
            lines[2],
            "src/app.js:2:7: error [J003]: Expected '===' but found '=='"
        );
    }

    #[test]
    fn summary_follows_violations() {
        let output = render(&sample_results());
        assert!(output.ends_with(
            "\nFound 1 error(s), 1 warning(s), 0 info and 0 hint(s) in 1 of 2 file(s)\n"
        ));
    }

    #[test]
    fn clean_run_prints_single_line() {
        let results = vec![CheckResult::new(
            "a.html",
            guidelint_core::Language::Html,
            vec![],
        )];
        assert_eq!(render(&results), "✓ No violations in 1 file(s)\n");
    }
}
