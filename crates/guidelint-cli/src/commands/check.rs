//! Check command - lints JavaScript, CSS and HTML files against the style rules

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use guidelint_core::config::resolve_config;
use guidelint_core::{CancellationToken, Checker, Config, LintRunner};

use crate::discovery::{FileFilter, discover_files};
use crate::output::{OutputFormat, RunStatus, report};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to check
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Configuration file (default: guidelint.toml found upwards from the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckArgs {
    pub fn run(&self) -> Result<ExitCode> {
        self.configure_colors();
        let mut stdout = io::stdout().lock();
        let status = self.execute(&mut stdout)?;
        Ok(ExitCode::from(status.exit_code()))
    }

    /// Load config, discover files, lint them and write the report to `sink`.
    /// Every error returned here happens before any file is checked.
    pub fn execute<W: Write>(&self, sink: &mut W) -> Result<RunStatus> {
        let config = self.load_config()?;
        let checker = Checker::with_config(&config.rules)?;
        for warning in checker.registry().unknown_references(&config.rules) {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }

        let filter = FileFilter::from_config(&config)?;
        let files = discover_files(&self.paths, &filter)?;
        if files.is_empty() {
            eprintln!("No JavaScript, CSS or HTML files found.");
        }

        let runner = LintRunner::new(checker);
        let outcome = runner.run(&files, &CancellationToken::new());
        let status = report(
            &outcome.results,
            self.format,
            runner.checker().registry(),
            sink,
        )?;
        Ok(status)
    }

    fn load_config(&self) -> Result<Config> {
        let cwd = env::current_dir()?;
        let config_result = resolve_config(self.config.as_deref(), &cwd)?;
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        Ok(config_result.config)
    }

    /// Color follows `NO_COLOR`; JSON output is never colored.
    fn configure_colors(&self) {
        let no_color_env = env::var("NO_COLOR").is_ok();
        if no_color_env || self.format == OutputFormat::Json {
            colored::control::set_override(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidelint_core::config::CONFIG_FILENAME;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn args(paths: Vec<PathBuf>, config: &Path, format: OutputFormat) -> CheckArgs {
        CheckArgs {
            paths,
            config: Some(config.to_path_buf()),
            format,
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    fn execute(args: &CheckArgs) -> (Result<RunStatus>, String) {
        colored::control::set_override(false);
        let mut sink = Vec::new();
        let status = args.execute(&mut sink);
        (status, String::from_utf8(sink).unwrap())
    }

    #[test]
    fn clean_project_passes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "var a = {};\n").unwrap();
        fs::write(dir.path().join("a.css"), "a {\n  top: 0;\n  color: red;\n}\n").unwrap();
        let config = write_config(dir.path(), "");

        let (status, output) = execute(&args(vec![dir.path().to_path_buf()], &config, OutputFormat::Text));

        assert_eq!(status.unwrap(), RunStatus::Pass);
        assert!(output.contains("No violations in 2 file(s)"));
    }

    #[test]
    fn violations_fail_the_run() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("item.js");
        fs::write(&file, "var item = new Object();\n").unwrap();
        let config = write_config(dir.path(), "");

        let (status, output) = execute(&args(vec![file], &config, OutputFormat::Text));

        assert_eq!(status.unwrap(), RunStatus::Fail);
        assert!(output.contains("item.js:1:12: warning [J001]"));
    }

    #[test]
    fn config_disables_rules_and_overrides_severity() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "var a = new Object();\nif (a == 1) {}\n").unwrap();
        let config = write_config(
            dir.path(),
            "[rules]\ndisabled = [\"literal-construction\"]\n\n[rules.severity]\neqeqeq = \"error\"\n",
        );

        let (status, output) = execute(&args(vec![file], &config, OutputFormat::Json));
        assert_eq!(status.unwrap(), RunStatus::Fail);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let violations = parsed["results"][0]["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0]["rule_id"], "J003");
        assert_eq!(violations[0]["severity"], "error");
    }

    #[test]
    fn invalid_config_is_a_startup_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "var a = 1;\n").unwrap();
        let config = write_config(dir.path(), "[rules\n");

        let (status, output) = execute(&args(vec![dir.path().to_path_buf()], &config, OutputFormat::Text));

        assert!(status.is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn invalid_rule_options_are_a_startup_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "a {\n  top: 0;\n}\n").unwrap();
        let config = write_config(
            dir.path(),
            "[rules.options.declaration-order]\norder = [\"layout\"]\n",
        );

        let (status, _) = execute(&args(vec![dir.path().to_path_buf()], &config, OutputFormat::Text));

        let error = status.unwrap_err();
        assert!(error.to_string().contains("declaration-order"));
    }

    #[test]
    fn missing_path_is_a_startup_error() {
        let dir = tempdir().unwrap();
        let config = write_config(dir.path(), "");

        let (status, _) = execute(&args(vec![dir.path().join("missing")], &config, OutputFormat::Text));

        assert!(status.is_err());
    }

    #[test]
    fn unparsable_file_is_reported_not_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.js"), "var a = (1;\n").unwrap();
        fs::write(dir.path().join("ok.js"), "var b = 1;\n").unwrap();
        let config = write_config(dir.path(), "");

        let (status, output) = execute(&args(vec![dir.path().to_path_buf()], &config, OutputFormat::Json));

        assert_eq!(status.unwrap(), RunStatus::Fail);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["summary"]["total_files"], 2);
        assert_eq!(parsed["results"][0]["violations"][0]["rule_id"], "parse-error");
        assert_eq!(parsed["results"][1]["passed"], true);
    }
}
