//! termdown - render markdown in the terminal, tables included.

mod cli;
mod completions;

use clap::Parser;
use cli::Args;
use std::process::ExitCode;
use termdown::output::colorize::ColorScheme;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ColorScheme::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so they never mix with rendered output.
/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "termdown=debug" } else { "termdown=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
