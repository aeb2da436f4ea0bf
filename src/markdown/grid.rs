//! Terminal table rendering
//!
//! [`TableRenderer`] lays a [`TableModel`] out on a box-drawing grid. The grid
//! itself sits behind [`GridBackend`]; [`ComfyBackend`] draws with comfy-table.

use super::table::{Alignment, TableModel};
use comfy_table::{modifiers, presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde::{Deserialize, Serialize};

/// What to do with body cells past the header's last column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Drop cells beyond the header's column count
    #[default]
    Clip,
    /// Add untitled columns so every cell is shown
    Widen,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clip" => Ok(OverflowPolicy::Clip),
            "widen" => Ok(OverflowPolicy::Widen),
            other => Err(format!("unknown overflow policy '{}' (clip, widen)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableBorder {
    #[default]
    Rounded,
    Sharp,
    Ascii,
    Minimal,
}

impl std::str::FromStr for TableBorder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rounded" => Ok(TableBorder::Rounded),
            "sharp" => Ok(TableBorder::Sharp),
            "ascii" => Ok(TableBorder::Ascii),
            "minimal" => Ok(TableBorder::Minimal),
            other => Err(format!(
                "unknown border '{}' (rounded, sharp, ascii, minimal)",
                other
            )),
        }
    }
}

/// A grid under construction
pub trait Grid {
    fn set_header(&mut self, cells: Vec<String>);
    fn set_justification(&mut self, column: usize, alignment: Alignment);
    fn append_row(&mut self, cells: Vec<String>);
    fn render(&self) -> String;
}

/// Factory for grids with a fixed number of columns
pub trait GridBackend {
    type Grid: Grid;

    fn create_grid(&self, columns: usize) -> Self::Grid;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComfyBackend {
    pub border: TableBorder,
    /// Total width to fit into; `None` lets the table take what it needs
    pub width: Option<u16>,
    pub bold_header: bool,
    /// Emit ANSI styling even when stdout is not a terminal
    pub styled: bool,
}

impl Default for ComfyBackend {
    fn default() -> Self {
        Self {
            border: TableBorder::default(),
            width: None,
            bold_header: true,
            styled: false,
        }
    }
}

impl GridBackend for ComfyBackend {
    type Grid = ComfyGrid;

    fn create_grid(&self, columns: usize) -> ComfyGrid {
        ComfyGrid {
            settings: *self,
            justification: vec![Alignment::Left; columns],
            header: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Collects cells and builds the comfy-table on render, once all columns exist
#[derive(Debug, Clone)]
pub struct ComfyGrid {
    settings: ComfyBackend,
    justification: Vec<Alignment>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ComfyGrid {
    fn cell(&self, column: usize, text: &str) -> Cell {
        let alignment = match self.justification.get(column).copied().unwrap_or_default() {
            Alignment::Left => CellAlignment::Left,
            Alignment::Center => CellAlignment::Center,
            Alignment::Right => CellAlignment::Right,
        };
        Cell::new(text).set_alignment(alignment)
    }
}

impl Grid for ComfyGrid {
    fn set_header(&mut self, cells: Vec<String>) {
        self.header = cells;
    }

    fn set_justification(&mut self, column: usize, alignment: Alignment) {
        if let Some(slot) = self.justification.get_mut(column) {
            *slot = alignment;
        }
    }

    fn append_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self) -> String {
        if self.justification.is_empty() {
            return String::new();
        }

        let mut table = Table::new();
        match self.settings.border {
            TableBorder::Rounded => {
                table
                    .load_preset(presets::UTF8_FULL)
                    .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
            }
            TableBorder::Sharp => {
                table.load_preset(presets::UTF8_FULL);
            }
            TableBorder::Ascii => {
                table.load_preset(presets::ASCII_FULL);
            }
            TableBorder::Minimal => {
                table.load_preset(presets::UTF8_BORDERS_ONLY);
            }
        }

        if self.settings.styled {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }

        if let Some(width) = self.settings.width {
            table.set_width(width);
            table.set_content_arrangement(ContentArrangement::Dynamic);
        }

        if !self.header.is_empty() {
            table.set_header(self.header.iter().enumerate().map(|(i, text)| {
                let cell = self.cell(i, text);
                if self.settings.bold_header {
                    cell.add_attribute(Attribute::Bold)
                } else {
                    cell
                }
            }));
        }

        for row in &self.rows {
            table.add_row(row.iter().enumerate().map(|(i, text)| self.cell(i, text)));
        }

        table.to_string()
    }
}

/// Lays a table model out on a grid.
///
/// Short rows are padded with empty trailing cells. Long rows follow the
/// [`OverflowPolicy`]: clipped to the header's width, or widened with
/// untitled left-justified columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer<B> {
    backend: B,
    overflow: OverflowPolicy,
}

impl<B: GridBackend> TableRenderer<B> {
    pub fn new(backend: B, overflow: OverflowPolicy) -> Self {
        Self { backend, overflow }
    }

    /// Number of grid columns a model occupies under this renderer's policy
    pub fn columns_for(&self, model: &TableModel) -> usize {
        match self.overflow {
            OverflowPolicy::Clip => model.column_count(),
            OverflowPolicy::Widen => model.max_row_len(),
        }
    }

    /// Consume the model and build its grid
    pub fn layout(&self, model: TableModel) -> B::Grid {
        let columns = self.columns_for(&model);
        let mut grid = self.backend.create_grid(columns);

        for column in 0..columns {
            grid.set_justification(column, model.alignment(column));
        }

        if columns > 0 {
            let header = fit(
                model.headers().iter().map(|cell| cell.text.clone()),
                columns,
            );
            grid.set_header(header);
            for row in model.rows() {
                grid.append_row(fit(row.iter().map(|cell| cell.text.clone()), columns));
            }
        }

        grid
    }

    #[tracing::instrument(skip(self, model), fields(columns, rows = model.rows().len()))]
    pub fn render(&self, model: TableModel) -> String {
        tracing::Span::current().record("columns", self.columns_for(&model));
        self.layout(model).render()
    }
}

/// Pad with empty cells or truncate to exactly `columns` cells
fn fit(cells: impl Iterator<Item = String>, columns: usize) -> Vec<String> {
    let mut cells: Vec<String> = cells.take(columns).collect();
    cells.resize(columns, String::new());
    cells
}
