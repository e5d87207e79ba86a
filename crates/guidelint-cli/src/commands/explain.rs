//! Explain command - shows the metadata and examples of one rule

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use guidelint_core::config::resolve_config;
use guidelint_core::{RuleRegistry, Severity, create_default_registry};

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[arg(
        value_name = "RULE",
        help = "Rule id or name to explain (e.g. \"J001\", \"quote-style\")"
    )]
    pub rule_id: String,

    /// Configuration file used to report the effective severity and status
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ExplainArgs {
    pub fn run(&self) -> Result<ExitCode> {
        let cwd = env::current_dir()?;
        let config = resolve_config(self.config.as_deref(), &cwd)?.config;
        let registry = create_default_registry(&config.rules)?;

        let mut stdout = io::stdout().lock();
        explain(&registry, &self.rule_id, &mut stdout)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn format_severity(severity: Severity) -> String {
    match severity {
        Severity::Error => "error".red().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
        Severity::Info => "info".blue().to_string(),
        Severity::Hint => "hint".cyan().to_string(),
    }
}

/// Describe the rule named `id_or_name`, or fail listing the known rules.
pub fn explain<W: Write>(registry: &RuleRegistry, id_or_name: &str, writer: &mut W) -> Result<()> {
    let Some(rule) = registry.find(id_or_name) else {
        let available: Vec<String> = registry
            .rules()
            .map(|rule| format!("{} ({})", rule.metadata().id, rule.metadata().name))
            .collect();
        anyhow::bail!(
            "Unknown rule '{}'. Available rules: {}",
            id_or_name,
            available.join(", ")
        );
    };

    let metadata = rule.metadata();
    let languages: Vec<&str> = metadata.languages.iter().map(|l| l.name()).collect();

    writeln!(writer)?;
    writeln!(writer, "{}", format!("Rule {}", metadata.id).bold())?;
    writeln!(writer)?;
    writeln!(writer, "  {}: {}", "Name".cyan(), metadata.name)?;
    writeln!(writer, "  {}: {}", "Description".cyan(), metadata.description)?;
    writeln!(writer, "  {}: {}", "Languages".cyan(), languages.join(", "))?;
    writeln!(
        writer,
        "  {}: {}",
        "Severity".cyan(),
        format_severity(registry.severity_for(metadata))
    )?;

    if let Some(examples) = metadata.examples {
        writeln!(writer)?;
        writeln!(writer, "  {}:", "Examples".cyan())?;
        for line in examples.lines() {
            writeln!(writer, "    {}", line)?;
        }
    }

    writeln!(writer)?;
    let status = if registry.is_rule_enabled(metadata.id) {
        "enabled".green()
    } else {
        "disabled".red()
    };
    writeln!(writer, "  {}: {}", "Status".cyan(), status)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidelint_core::RulesConfig;

    fn render(config: &RulesConfig, rule: &str) -> Result<String> {
        colored::control::set_override(false);
        let registry = create_default_registry(config).unwrap();
        let mut sink = Vec::new();
        explain(&registry, rule, &mut sink)?;
        Ok(String::from_utf8(sink).unwrap())
    }

    #[test]
    fn explain_by_id_shows_metadata_and_examples() {
        let output = render(&RulesConfig::default(), "J001").unwrap();

        assert!(output.contains("Rule J001"));
        assert!(output.contains("Name: literal-construction"));
        assert!(output.contains("Languages: javascript"));
        assert!(output.contains("Severity: warning"));
        assert!(output.contains("    var item = new Object();"));
        assert!(output.contains("Status: enabled"));
    }

    #[test]
    fn explain_by_name_and_lowercase_id() {
        assert!(render(&RulesConfig::default(), "quote-style").unwrap().contains("Rule J002"));
        assert!(render(&RulesConfig::default(), "c001").unwrap().contains("declaration-order"));
    }

    #[test]
    fn explain_reflects_config() {
        let config = RulesConfig {
            disabled: vec!["F001".to_string()],
            severity: [("trailing-newline".to_string(), Severity::Error)]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let output = render(&config, "trailing-newline").unwrap();

        assert!(output.contains("Severity: error"));
        assert!(output.contains("Status: disabled"));
        assert!(output.contains("Languages: javascript, css, html"));
    }

    #[test]
    fn unknown_rule_lists_available_rules() {
        let error = render(&RulesConfig::default(), "Q999").unwrap_err().to_string();

        assert!(error.starts_with("Unknown rule 'Q999'"));
        assert!(error.contains("J001 (literal-construction)"));
        assert!(error.contains("F001 (trailing-newline)"));
    }

    #[test]
    fn every_rule_has_examples() {
        let registry = create_default_registry(&RulesConfig::default()).unwrap();
        for rule in registry.rules() {
            assert!(
                rule.metadata().examples.is_some(),
                "{} should have examples",
                rule.metadata().id
            );
        }
    }
}
