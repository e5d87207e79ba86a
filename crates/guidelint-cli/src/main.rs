//! guidelint CLI - checks JavaScript, CSS and HTML against style-guide rules
//!
//! Exit codes: 0 when every file passes, 1 when violations were found, 2 when
//! the run could not start (bad arguments, config or paths).

mod commands;
mod discovery;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use commands::Commands;

const STARTUP_ERROR_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "guidelint",
    author,
    version,
    about = "Style-guide linter for JavaScript, CSS and HTML",
    long_about = "guidelint checks JavaScript, CSS and HTML files against the conventions\n\
                  of common style guides: literal construction, quoting, brace placement,\n\
                  naming, declaration and attribute order, indentation and more."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Explain(args) => args.run(),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {:#}", "error:".red().bold(), error);
            ExitCode::from(STARTUP_ERROR_EXIT_CODE)
        }
    }
}
