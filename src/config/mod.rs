//! Configuration module - handles loading and merging configs

mod defaults;
mod loader;

pub use defaults::*;

use crate::markdown::grid::{OverflowPolicy, TableBorder};
use crate::markdown::tokenizer::TokenizerOptions;
use crate::markdown::RenderOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tokenizer: TokenizerOptions,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub table: TableConfig,
}

/// Page layout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Fixed width in columns; the terminal width is used when unset
    #[serde(default)]
    pub width: Option<usize>,

    #[serde(default = "default_true")]
    pub color: bool,
}

/// Table layout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub overflow: OverflowPolicy,

    #[serde(default)]
    pub border: TableBorder,

    #[serde(default = "default_true")]
    pub bold_header: bool,
}

/// Settings given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub width: Option<usize>,
    pub color: Option<bool>,
    pub overflow: Option<OverflowPolicy>,
    pub border: Option<TableBorder>,
    pub table: Option<bool>,
    pub strikethrough: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: None,
            color: true,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::default(),
            border: TableBorder::default(),
            bold_header: true,
        }
    }
}

impl Config {
    /// Apply CLI overrides (highest precedence)
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(width) = overrides.width {
            self.render.width = Some(width);
        }
        if let Some(color) = overrides.color {
            self.render.color = color;
        }
        if let Some(overflow) = overrides.overflow {
            self.table.overflow = overflow;
        }
        if let Some(border) = overrides.border {
            self.table.border = border;
        }
        if let Some(table) = overrides.table {
            self.tokenizer.table = table;
        }
        if let Some(strikethrough) = overrides.strikethrough {
            self.tokenizer.strikethrough = strikethrough;
        }
        self
    }

    /// Resolve into options for one render.
    ///
    /// `terminal_width` is only used when no width is configured. Colour is
    /// dropped when the output is not a terminal.
    pub fn render_options(
        &self,
        terminal_width: Option<usize>,
        is_terminal: bool,
    ) -> RenderOptions {
        RenderOptions {
            tokenizer: self.tokenizer,
            width: self
                .render
                .width
                .or(terminal_width)
                .unwrap_or(DEFAULT_WIDTH),
            color: self.render.color && is_terminal,
            overflow: self.table.overflow,
            border: self.table.border,
            bold_header: self.table.bold_header,
        }
    }
}
