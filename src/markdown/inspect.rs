//! Debug views of the pipeline's intermediate stages

use super::grid::{ComfyBackend, Grid, GridBackend};
use super::table::{self, TableModel};
use super::token::Token;
use crate::error::{RenderError, Result};
use serde::Serialize;

const CONTENT_PREVIEW: usize = 40;

/// Token stream as a Type / Tag / Nesting / Content grid
pub fn token_table(tokens: &[Token], backend: &ComfyBackend) -> String {
    let mut grid = backend.create_grid(4);
    grid.set_header(
        ["Type", "Tag", "Nesting", "Content"]
            .into_iter()
            .map(String::from)
            .collect(),
    );

    for token in tokens {
        grid.append_row(vec![
            token.name().to_string(),
            dash_if_empty(token.tag()),
            token.nesting().label().to_string(),
            dash_if_empty(&preview(token.content())),
        ]);
    }

    grid.render()
}

fn dash_if_empty(text: &str) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        text.to_string()
    }
}

/// First 40 characters on one line, `...` when cut
fn preview(content: &str) -> String {
    let mut text: String = content.chars().take(CONTENT_PREVIEW).collect();
    if content.chars().count() > CONTENT_PREVIEW {
        text.push_str("...");
    }
    text.replace('\n', "\\n")
}

#[derive(Debug, Serialize)]
pub struct Dump<'a> {
    pub tokens: &'a [Token],
    pub tables: Vec<TableModel>,
}

/// Tokens plus every extracted table, as pretty JSON
pub fn json_dump(tokens: &[Token]) -> Result<String> {
    let dump = Dump {
        tokens,
        tables: table::extract_all(tokens)?,
    };
    to_json(&dump)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| RenderError::Encode {
        reason: err.to_string(),
    })
}
