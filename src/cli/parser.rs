//! Command line arguments

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;
use termdown::config::Overrides;
use termdown::markdown::grid::{OverflowPolicy, TableBorder};
use termdown::output::OutputMode;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "termdown",
    version,
    about = "Render markdown documents, tables included, as styled terminal output"
)]
pub struct Args {
    /// Markdown file to render; reads stdin when absent or "-"
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the token stream as a table
    #[arg(long, group = "mode")]
    pub tokens: bool,

    /// Print the syntax tree outline
    #[arg(long, group = "mode")]
    pub tree: bool,

    /// Print the syntax tree with inline text
    #[arg(long, group = "mode")]
    pub tree_text: bool,

    /// Print tokens and extracted tables as JSON
    #[arg(long, group = "mode")]
    pub json: bool,

    /// Print the document unchanged
    #[arg(long, group = "mode")]
    pub raw: bool,

    /// Disable colorized output
    #[arg(long)]
    pub no_color: bool,

    /// Output width in columns (defaults to the terminal width)
    #[arg(short, long, value_name = "COLUMNS", value_parser = clap::value_parser!(u16).range(1..))]
    pub width: Option<u16>,

    /// What to do with cells beyond the header's columns
    #[arg(long, value_name = "POLICY", value_parser = ["clip", "widen"])]
    pub overflow: Option<String>,

    /// Table border style
    #[arg(long, value_name = "STYLE", value_parser = ["rounded", "sharp", "ascii", "minimal"])]
    pub border: Option<String>,

    /// Treat table syntax as plain paragraphs
    #[arg(long)]
    pub no_tables: bool,

    /// Leave ~~strikethrough~~ markers as text
    #[arg(long)]
    pub no_strikethrough: bool,

    /// Use this config file instead of the discovered ones
    #[arg(long, value_name = "PATH", env = "TERMDOWN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export example termdown.toml to stdout
    #[arg(long)]
    pub make_config: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Log pipeline diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Selected output mode; clap guarantees at most one mode flag
    pub fn mode(&self) -> OutputMode {
        if self.tokens {
            OutputMode::Tokens
        } else if self.tree {
            OutputMode::Tree { show_text: false }
        } else if self.tree_text {
            OutputMode::Tree { show_text: true }
        } else if self.json {
            OutputMode::Json
        } else if self.raw {
            OutputMode::Raw
        } else {
            OutputMode::Rendered
        }
    }

    /// Settings that take precedence over config files and environment
    pub fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width.map(usize::from),
            color: self.no_color.then_some(false),
            overflow: self
                .overflow
                .as_deref()
                .and_then(|v| v.parse::<OverflowPolicy>().ok()),
            border: self
                .border
                .as_deref()
                .and_then(|v| v.parse::<TableBorder>().ok()),
            table: self.no_tables.then_some(false),
            strikethrough: self.no_strikethrough.then_some(false),
        }
    }

    /// Path to read, `None` for stdin
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|p| p.as_os_str() != "-")
    }
}
