//! Markdown to terminal pipeline
//!
//! markup → [`tokenizer`] → [`token::normalize`] → [`tree::SyntaxTree`] →
//! [`render::DocumentRenderer`], with tables going through
//! [`table::TableModel`] and [`grid::TableRenderer`].

pub mod grid;
pub mod inspect;
pub mod render;
pub mod table;
pub mod token;
pub mod tokenizer;
pub mod tree;

use crate::error::Result;
use grid::{OverflowPolicy, TableBorder};
use token::Token;
use tokenizer::{PulldownTokenizer, Tokenizer, TokenizerOptions};
use tree::SyntaxTree;

pub use render::DocumentRenderer;
pub use table::{Alignment, TableCell, TableModel};

/// Everything a single render needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub tokenizer: TokenizerOptions,
    /// Target width in columns
    pub width: usize,
    pub color: bool,
    pub overflow: OverflowPolicy,
    pub border: TableBorder,
    pub bold_header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::default(),
            width: 80,
            color: true,
            overflow: OverflowPolicy::default(),
            border: TableBorder::default(),
            bold_header: true,
        }
    }
}

/// Tokenize and validate markup
pub fn tokenize(source: &str, options: &RenderOptions) -> Result<Vec<Token>> {
    let raw = PulldownTokenizer::new(options.tokenizer).tokenize(source);
    token::normalize(raw)
}

/// Tokenize, validate and build the syntax tree
pub fn parse(source: &str, options: &RenderOptions) -> Result<SyntaxTree> {
    SyntaxTree::build(tokenize(source, options)?)
}

/// Render a markup document to terminal text in one pass
pub fn render_document(source: &str, options: &RenderOptions) -> Result<String> {
    let tree = parse(source, options)?;
    DocumentRenderer::new(options).render(&tree)
}
