//! Init command - writes a commented default configuration file

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use guidelint_core::config::CONFIG_FILENAME;

const DEFAULT_CONFIG: &str = r#"# guidelint configuration file

# File patterns to check, relative to each checked directory
# include = ["src/**"]

# File patterns to skip
# exclude = ["**/vendor/**", "**/*.min.js"]

[rules]
# Disable rules by id or name
# disabled = ["comma-style"]

# Turn whole languages off
# javascript = true
# css = true
# html = true

# Override rule severity (error, warning, info, hint)
[rules.severity]
# eqeqeq = "error"

# Per-rule options, keyed by rule name
[rules.options.quote-style]
preferred = "single"
avoid-escape = true

[rules.options.indent]
width = 2

[rules.options.css-indent]
width = 2

[rules.options.html-indent]
width = 2

[rules.options.declaration-order]
order = ["positioning", "box-model", "typography", "other"]

[rules.options.attribute-order]
order = ["id", "class", "data-*", "other"]
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<ExitCode> {
        let cwd = env::current_dir()?;
        write_default_config(&cwd, self.force)?;
        println!(
            "{} Created {} configuration file",
            "✓".green().bold(),
            CONFIG_FILENAME.cyan()
        );
        Ok(ExitCode::SUCCESS)
    }
}

pub fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file '{}' already exists. Use --force to overwrite.",
            CONFIG_FILENAME
        );
    }

    fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}
