//! CLI module - handles argument parsing and command execution

mod parser;

pub use parser::*;

use anyhow::{Context, Result};
use std::io::{IsTerminal, Read};
use termdown::config::{Config, DEFAULT_CONFIG_TEMPLATE};
use termdown::output::colorize::ColorScheme;
use termdown::output::OutputFormatter;

/// Main entry point for the CLI
pub fn run(args: Args) -> Result<()> {
    if args.make_config {
        print!("{}", DEFAULT_CONFIG_TEMPLATE);
        return Ok(());
    }

    if let Some(shell) = args.completions {
        crate::completions::generate_completions(shell);
        return Ok(());
    }

    let config = match args.config {
        Some(ref path) => Config::load_explicit(path)?,
        None => Config::load()?,
    };
    let config = config.with_overrides(&args.overrides());
    tracing::debug!(?config, "resolved configuration");

    let (name, source) = read_input(&args)?;
    let formatter = OutputFormatter::new(&config, args.mode());
    formatter
        .print(&source)
        .with_context(|| format!("failed to render {}", name))
}

/// Read the document named on the command line, or stdin
fn read_input(args: &Args) -> Result<(String, String)> {
    match args.input_path() {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                ColorScheme::print_warning("reading markdown from stdin, end with Ctrl-D");
            }
            let mut source = String::new();
            stdin
                .lock()
                .read_to_string(&mut source)
                .context("cannot read stdin")?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}
