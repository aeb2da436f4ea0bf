use crate::config::Config;
use crate::error::Result;
use crate::markdown::grid::ComfyBackend;
use crate::markdown::{inspect, render_document, tokenize, tree::SyntaxTree, RenderOptions};
use std::io::IsTerminal;

/// What to print for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Styled terminal rendering
    #[default]
    Rendered,
    /// The markup unchanged
    Raw,
    /// Tokens and extracted tables as JSON
    Json,
    /// Token stream as a table
    Tokens,
    /// Syntax tree outline, optionally with text
    Tree { show_text: bool },
}

pub struct OutputFormatter {
    mode: OutputMode,
    options: RenderOptions,
}

impl OutputFormatter {
    pub fn new(config: &Config, mode: OutputMode) -> Self {
        let is_terminal = std::io::stdout().is_terminal();
        let terminal_width =
            terminal_size::terminal_size().map(|(terminal_size::Width(w), _)| w as usize);

        Self {
            mode,
            options: config.render_options(terminal_width, is_terminal),
        }
    }

    pub fn with_options(mode: OutputMode, options: RenderOptions) -> Self {
        Self { mode, options }
    }

    /// Produce the output text for a document
    pub fn format(&self, source: &str) -> Result<String> {
        match self.mode {
            OutputMode::Rendered => render_document(source, &self.options),
            OutputMode::Raw => Ok(source.to_string()),
            OutputMode::Json => inspect::json_dump(&tokenize(source, &self.options)?),
            OutputMode::Tokens => {
                let tokens = tokenize(source, &self.options)?;
                Ok(inspect::token_table(&tokens, &self.inspect_backend()))
            }
            OutputMode::Tree { show_text } => {
                let tree = SyntaxTree::build(tokenize(source, &self.options)?)?;
                Ok(tree.root().pretty(2, show_text))
            }
        }
    }

    /// Format and print the document
    pub fn print(&self, source: &str) -> Result<()> {
        let output = self.format(source)?;
        if output.ends_with('\n') {
            print!("{}", output);
        } else {
            println!("{}", output);
        }
        Ok(())
    }

    fn inspect_backend(&self) -> ComfyBackend {
        ComfyBackend {
            border: self.options.border,
            width: None,
            bold_header: self.options.bold_header,
            styled: self.options.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(mode: OutputMode) -> OutputFormatter {
        OutputFormatter::with_options(
            mode,
            RenderOptions {
                color: false,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_raw_passes_through() {
        let out = formatter(OutputMode::Raw).format("**x**").unwrap();
        assert_eq!(out, "**x**");
    }

    #[test]
    fn test_tree_mode() {
        let out = formatter(OutputMode::Tree { show_text: false })
            .format("# Title\n\n> Quote")
            .unwrap();
        assert_eq!(
            out,
            "<root>\n  <h1>\n    <inline>\n  <blockquote>\n    <p>\n      <inline>\n"
        );
    }

    #[test]
    fn test_json_mode_is_valid_json() {
        let out = formatter(OutputMode::Json).format("| a |\n|---|\n").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["tokens"].is_array());
        assert_eq!(value["tables"][0]["rows"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_tokens_mode() {
        let out = formatter(OutputMode::Tokens).format("text").unwrap();
        assert!(out.contains("paragraph_open"));
        assert!(out.contains("Nesting"));
    }

    #[test]
    fn test_rendered_mode() {
        let out = formatter(OutputMode::Rendered).format("plain").unwrap();
        assert_eq!(out, "plain\n");
    }
}
