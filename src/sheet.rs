//! In-memory model of a worksheet: cell values plus indentation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker pandas-style readers give to header cells with no label
pub const PLACEHOLDER_MARKER: &str = "Unnamed";

/// A single cell value. `Empty` doubles as the "missing" marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Missing, or text consisting only of whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String form with missing rendered as the empty string
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    /// Trimmed string form, `None` when blank
    pub fn trimmed(&self) -> Option<String> {
        let text = self.as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("NaN"),
            other => f.write_str(&other.as_text()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

/// Integral values print without a fractional part
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A cell with its alignment indent level (0 = top level)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCell {
    pub value: CellValue,
    pub indent: u32,
}

impl RawCell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            indent: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn indented(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }
}

/// Rectangular grid of cells. Row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<RawCell>>,
    width: usize,
}

impl RawSheet {
    /// Build a sheet, padding short rows with empty cells
    pub fn from_rows(mut rows: Vec<Vec<RawCell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, RawCell::empty());
        }
        Self { rows, width }
    }

    /// Build a sheet from plain values, every indent 0
    pub fn from_values(rows: Vec<Vec<CellValue>>) -> Self {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(RawCell::new).collect())
                .collect(),
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of rows, header included
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&RawCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    /// Rows below the header
    pub fn data_rows(&self) -> &[Vec<RawCell>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// Header labels, blank headers replaced by `Unnamed: <index>`
    pub fn header_names(&self) -> Vec<String> {
        (0..self.width)
            .map(|col| match self.cell(0, col) {
                Some(cell) if !cell.value.is_missing() => cell.value.as_text(),
                _ => format!("{}: {}", PLACEHOLDER_MARKER, col),
            })
            .collect()
    }

    /// Index of the first column whose header is exactly `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header_names().iter().position(|h| h == name)
    }
}
