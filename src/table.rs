//! Normalized table and the loader that builds it from a workbook

use crate::config::{DuplicateKeyPolicy, TrnConfig, DEFAULT_TRANSACTION_OFFSET};
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TrnError};
use crate::hierarchy::HierarchyExtractor;
use crate::identifiers::{ColumnKey, IdentifierGenerator};
use crate::sheet::{CellValue, RawSheet};
use crate::workbook;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::Path;

/// Name of the row index
pub const INDEX_NAME: &str = "Unique_ID";

/// Rows indexed by row key, columns identified by [`ColumnKey`].
///
/// Row order is the order of first insertion; re-inserting a key replaces the
/// row in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    columns: Vec<ColumnKey>,
    rows: IndexMap<String, Vec<CellValue>>,
}

impl NormalizedTable {
    pub fn new(columns: Vec<ColumnKey>) -> Self {
        Self {
            columns,
            rows: IndexMap::new(),
        }
    }

    /// Insert a row, padding or truncating it to the column count.
    /// Returns the replaced row when the key was already present.
    pub fn insert_row(
        &mut self,
        key: impl Into<String>,
        mut values: Vec<CellValue>,
    ) -> Option<Vec<CellValue>> {
        values.resize(self.columns.len(), CellValue::Empty);
        self.rows.insert(key.into(), values)
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(ColumnKey::name).collect()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn row(&self, key: &str) -> Option<&[CellValue]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&String, &Vec<CellValue>)> {
        self.rows.iter()
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &String> {
        self.rows.keys()
    }

    /// Cell at row `key`, column named `column`
    pub fn value(&self, key: &str, column: &str) -> Option<&CellValue> {
        let col = self.column_position(column)?;
        self.rows.get(key).and_then(|row| row.get(col))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }
}

/// Distinct transaction-type headers from the default column offset onward
pub fn list_transaction_types(table: &NormalizedTable) -> BTreeSet<String> {
    list_transaction_types_from(table, DEFAULT_TRANSACTION_OFFSET)
}

/// Distinct, sorted headers of columns at or after `offset`, placeholders excluded
pub fn list_transaction_types_from(table: &NormalizedTable, offset: usize) -> BTreeSet<String> {
    table
        .columns()
        .iter()
        .filter(|c| c.source_index >= offset && !c.has_placeholder_header())
        .map(|c| c.header.clone())
        .collect()
}

/// Transaction types offered by both tables
pub fn common_transaction_types(
    left: &BTreeSet<String>,
    right: &BTreeSet<String>,
) -> BTreeSet<String> {
    left.intersection(right).cloned().collect()
}

/// Reads a workbook sheet and builds its [`NormalizedTable`]
pub struct TableLoader<'a> {
    config: &'a TrnConfig,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> TableLoader<'a> {
    pub fn new(config: &'a TrnConfig, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    pub fn load(&self, path: &Path) -> Result<NormalizedTable> {
        self.diagnostics
            .info(&format!("Loading data from {}", path.display()));
        let sheet = workbook::read_sheet(path, &self.config.sheet_name, self.diagnostics)?;
        self.build(&sheet)
    }

    /// Like [`load`](Self::load) but any failure becomes an empty table plus an
    /// error diagnostic.
    pub fn load_or_empty(&self, path: &Path) -> NormalizedTable {
        match self.load(path) {
            Ok(table) => table,
            Err(e) => {
                self.diagnostics
                    .error(&format!("Error processing Excel file: {}", e));
                NormalizedTable::default()
            }
        }
    }

    /// Transaction types of `table` using the configured column offset
    pub fn transaction_types(&self, table: &NormalizedTable) -> BTreeSet<String> {
        let types = list_transaction_types_from(table, self.config.transaction_offset);
        self.diagnostics.info(&format!(
            "Transaction types loaded: {:?}",
            types.iter().collect::<Vec<_>>()
        ));
        types
    }

    /// Index rows by row key, name columns by column key and drop columns
    /// that never resolved to a name.
    pub fn build(&self, sheet: &RawSheet) -> Result<NormalizedTable> {
        if sheet.is_empty() {
            self.diagnostics.warn("Sheet is empty");
            return Ok(NormalizedTable::default());
        }

        let hierarchy = HierarchyExtractor::new(self.diagnostics).extract(sheet);
        let identifiers = IdentifierGenerator::new(self.diagnostics);
        let row_keys = identifiers.row_keys(sheet, &hierarchy);
        let column_keys = identifiers.column_keys(sheet);

        let kept: Vec<usize> = column_keys
            .iter()
            .enumerate()
            .filter(|(_, key)| !key.is_unresolved())
            .map(|(i, _)| i)
            .collect();
        let columns = kept.iter().map(|&i| column_keys[i].clone()).collect();
        let mut table = NormalizedTable::new(columns);

        let mut blank_rows = 0usize;
        for (row_number, (key, row)) in row_keys.iter().zip(sheet.data_rows()).enumerate() {
            if row.iter().all(|cell| cell.value.is_blank()) {
                blank_rows += 1;
                continue;
            }
            let values = kept.iter().map(|&i| row[i].value.clone()).collect();
            if table.insert_row(key.clone(), values).is_some() {
                match self.config.duplicate_keys {
                    DuplicateKeyPolicy::Overwrite => self.diagnostics.warn(&format!(
                        "Duplicate {} '{}' at data row {} replaces an earlier row",
                        INDEX_NAME,
                        key,
                        row_number + 1
                    )),
                    DuplicateKeyPolicy::Reject => return Err(TrnError::key_collision(key.clone())),
                }
            }
        }

        if blank_rows > 0 {
            self.diagnostics
                .info(&format!("Skipped {} blank row(s)", blank_rows));
        }
        self.diagnostics.info(&format!(
            "Finished processing sheet: {} rows x {} columns",
            table.row_count(),
            table.column_count()
        ));
        Ok(table)
    }
}
