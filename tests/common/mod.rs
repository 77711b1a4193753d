//! Common test utilities and helpers

use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use trnmodel::{Result, TrnError};

/// A cell written into a fixture workbook
#[derive(Debug, Clone)]
pub enum Cell {
    Blank,
    Text(&'static str),
    Indented(&'static str, u8),
    Number(f64),
}

pub use Cell::{Blank, Indented, Number, Text};

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> TrnError {
    TrnError::invalid_input(format!("Failed to write fixture workbook: {}", e))
}

/// Test fixture manager for creating temporary workbooks
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a workbook with a single sheet called `sheet_name`
    pub fn create_workbook(&self, name: &str, sheet_name: &str, rows: &[Vec<Cell>]) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name).map_err(xlsx_error)?;

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Blank => {}
                    Text(text) => {
                        worksheet.write_string(r, c, *text).map_err(xlsx_error)?;
                    }
                    Indented(text, indent) => {
                        let format = Format::new().set_indent(*indent);
                        worksheet
                            .write_string_with_format(r, c, *text, &format)
                            .map_err(xlsx_error)?;
                    }
                    Number(n) => {
                        worksheet.write_number(r, c, *n).map_err(xlsx_error)?;
                    }
                }
            }
        }

        workbook.save(&path).map_err(xlsx_error)?;
        Ok(path)
    }

    /// Write a workbook whose model sheet is named `Trn Model`
    pub fn create_model(&self, name: &str, rows: &[Vec<Cell>]) -> Result<PathBuf> {
        self.create_workbook(name, "Trn Model", rows)
    }

    /// Create a corrupted file for testing error handling
    pub fn create_corrupted_file(&self, name: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, b"\x00\x01\x02\x03invalid_data\xff\xfe")?;
        Ok(path)
    }
}

/// Sample transaction models
pub mod sample_data {
    use super::*;

    /// Header row: eight metadata columns, then TypeA/TypeB each spanning Value and Rate
    pub fn header() -> Vec<Cell> {
        vec![
            Text("Line Item"),
            Text("Variable"),
            Text("Unit"),
            Text("Source"),
            Text("Notes"),
            Text("Owner"),
            Text("Status"),
            Text("Ref"),
            Text("TypeA"),
            Blank,
            Text("TypeB"),
            Blank,
        ]
    }

    pub fn sub_header() -> Vec<Cell> {
        let mut row = vec![Blank; 8];
        row.extend([Text("Value"), Text("Rate"), Text("Value"), Text("Rate")]);
        row
    }

    /// Data row: label, variable, then TypeA value/rate and TypeB value/rate
    pub fn data_row(label: Cell, variable: Cell, values: [Cell; 4]) -> Vec<Cell> {
        let mut row = vec![label, variable];
        row.extend(vec![Blank; 6]);
        row.extend(values);
        row
    }

    pub fn base_model() -> Vec<Vec<Cell>> {
        vec![
            header(),
            sub_header(),
            data_row(Indented("Assets", 0), Blank, [Number(100.0), Blank, Blank, Blank]),
            data_row(
                Indented("Cash", 1),
                Text("Balance"),
                [Number(200.0), Number(0.5), Number(250.0), Number(0.5)],
            ),
            data_row(Blank, Text("Fee"), [Blank, Blank, Number(5.0), Blank]),
            data_row(
                Indented("Liabilities", 0),
                Text("Loan"),
                [Number(300.0), Blank, Number(300.0), Blank],
            ),
        ]
    }

    /// `base_model` with the TypeA loan changed and an Equity row added
    pub fn revised_model() -> Vec<Vec<Cell>> {
        let mut rows = base_model();
        rows[5] = data_row(
            Indented("Liabilities", 0),
            Text("Loan"),
            [Number(350.0), Blank, Number(300.0), Blank],
        );
        rows.push(data_row(
            Indented("Equity", 0),
            Text("Capital"),
            [Number(10.0), Blank, Blank, Blank],
        ));
        rows
    }
}
