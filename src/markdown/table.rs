//! Table extraction
//!
//! Reduces the tokens of one table into a [`TableModel`]: header cells, body
//! rows and one alignment per column. Ragged rows are kept exactly as written;
//! padding and clipping are the renderer's business.

use super::token::{Nesting, Token, TokenKind};
use super::tree::Node;
use crate::error::{RenderError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Column justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Resolve a `style` attribute such as `text-align:center`.
    ///
    /// Only the `text-align` declaration is looked at; anything unrecognised
    /// falls back to left.
    pub fn from_style(style: &str) -> Self {
        style
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .find(|(property, _)| property.trim().eq_ignore_ascii_case("text-align"))
            .map(|(_, value)| match value.trim().to_ascii_lowercase().as_str() {
                "center" => Alignment::Center,
                "right" => Alignment::Right,
                _ => Alignment::Left,
            })
            .unwrap_or_default()
    }

    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        attributes
            .get("style")
            .map(|style| Self::from_style(style))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub text: String,
    pub column: usize,
}

/// A finished table. Nothing can change it after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableModel {
    headers: Vec<TableCell>,
    rows: Vec<Vec<TableCell>>,
    alignments: Vec<Alignment>,
}

impl TableModel {
    /// Extract from a token slice that starts with the table's open token.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self> {
        extract(tokens, 0).map(|(model, _)| model)
    }

    /// Extract from a `<table>` node of a syntax tree
    pub fn from_node(node: Node<'_>) -> Result<Self> {
        if node.tag() != "table" {
            return Err(RenderError::malformed(
                0,
                format!("expected a <table> node, found <{}>", node.tag()),
            ));
        }
        Self::from_tokens(&node.to_tokens())
    }

    pub fn headers(&self) -> &[TableCell] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<TableCell>] {
        &self.rows
    }

    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Column count as declared by the header row
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Widest row, header included
    pub fn max_row_len(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Justification for a column, left when the header gave none
    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }
}

/// Extract every top-level table in a document's token stream, in order
pub fn extract_all(tokens: &[Token]) -> Result<Vec<TableModel>> {
    let mut tables = Vec::new();
    let mut position = 0;
    while position < tokens.len() {
        if tokens[position].is_open("table") {
            let (model, end) = extract(tokens, position)?;
            tables.push(model);
            position = end + 1;
        } else {
            position += 1;
        }
    }
    Ok(tables)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeHeader,
    InHeader,
    BetweenSections,
    InBody,
    Done,
}

/// Mutable half of the model, owned by the extractor until [`freeze`](Self::freeze)
#[derive(Debug, Default)]
struct TableBuilder {
    headers: Vec<TableCell>,
    rows: Vec<Vec<TableCell>>,
    alignments: Vec<Alignment>,
    row: Vec<TableCell>,
    in_cell: bool,
}

impl TableBuilder {
    fn push_cell(&mut self, text: String) {
        let column = self.row.len();
        self.row.push(TableCell { text, column });
    }

    fn freeze(self) -> TableModel {
        TableModel {
            headers: self.headers,
            rows: self.rows,
            alignments: self.alignments,
        }
    }
}

/// Run the extraction state machine from the table-open at `start`.
///
/// Returns the model and the index of the matching table-close.
fn extract(tokens: &[Token], start: usize) -> Result<(TableModel, usize)> {
    match tokens.get(start) {
        Some(token) if token.is_open("table") => {}
        Some(token) => {
            return Err(RenderError::malformed(
                start,
                format!("expected table_open, found `{}`", token.name()),
            ))
        }
        None => {
            return Err(RenderError::malformed(start, "expected table_open, found end of stream"))
        }
    }

    let mut phase = Phase::BeforeHeader;
    let mut builder = TableBuilder::default();

    for (offset, token) in tokens[start + 1..].iter().enumerate() {
        let position = start + 1 + offset;
        phase = step(phase, &mut builder, token, position)?;
        tracing::trace!(position, token = token.name(), ?phase, "table transition");

        if phase == Phase::Done {
            let model = builder.freeze();
            tracing::debug!(
                columns = model.column_count(),
                rows = model.rows().len(),
                "table extracted"
            );
            return Ok((model, position));
        }
    }

    Err(RenderError::UnterminatedTable { position: start })
}

fn step(phase: Phase, builder: &mut TableBuilder, token: &Token, position: usize) -> Result<Phase> {
    let unexpected = || {
        Err(RenderError::malformed(
            position,
            format!("unexpected `{}` in table ({:?})", token.name(), phase),
        ))
    };

    match (token.nesting(), token.tag()) {
        (Nesting::Open, "table") => unexpected(),
        (Nesting::Close, "table") => match phase {
            Phase::BeforeHeader | Phase::BetweenSections => Ok(Phase::Done),
            _ => unexpected(),
        },

        (Nesting::Open, "thead") => match phase {
            Phase::BeforeHeader => Ok(Phase::InHeader),
            _ => unexpected(),
        },
        (Nesting::Close, "thead") => match phase {
            Phase::InHeader => {
                // An empty buffer here means a zero-column table
                builder.headers = std::mem::take(&mut builder.row);
                Ok(Phase::BetweenSections)
            }
            _ => unexpected(),
        },

        (Nesting::Open, "tbody") => match phase {
            Phase::BeforeHeader | Phase::BetweenSections => Ok(Phase::InBody),
            _ => unexpected(),
        },
        (Nesting::Close, "tbody") => match phase {
            Phase::InBody => Ok(Phase::BetweenSections),
            _ => unexpected(),
        },

        (Nesting::Close, "tr") => {
            match phase {
                Phase::InBody => {
                    if !builder.row.is_empty() {
                        let row = std::mem::take(&mut builder.row);
                        builder.rows.push(row);
                    }
                }
                // The header row is committed by the header section's close
                Phase::InHeader => {}
                _ => builder.row.clear(),
            }
            Ok(phase)
        }

        (Nesting::Open, "th" | "td") => {
            if phase == Phase::InHeader {
                builder
                    .alignments
                    .push(Alignment::from_attributes(token.attributes()));
            }
            builder.in_cell = true;
            Ok(phase)
        }
        (Nesting::Close, "th" | "td") => {
            builder.in_cell = false;
            Ok(phase)
        }

        _ if token.kind() == TokenKind::Inline && builder.in_cell => {
            builder.push_cell(token.plain_text());
            Ok(phase)
        }

        _ => Ok(phase),
    }
}
