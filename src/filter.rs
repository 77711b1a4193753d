//! Transaction-type filtering of a normalized table

use crate::config::MatchMode;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TrnError};
use crate::identifiers::{ColumnKey, ROW_KEY_SEPARATOR, VARIABLE_COLUMN};
use crate::sheet::CellValue;
use crate::table::{NormalizedTable, INDEX_NAME};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Facet column holding the row key part before the first `.`
pub const CATEGORY_COLUMN: &str = "Category";

/// Columns derived from the row key rather than read from the sheet
pub const FACET_COLUMNS: [&str; 2] = [CATEGORY_COLUMN, VARIABLE_COLUMN];

/// Whether `column` belongs to the transaction type named by `token`.
/// A blank token matches nothing.
pub fn column_matches(column: &ColumnKey, token: &str, mode: MatchMode) -> bool {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return false;
    }
    match mode {
        MatchMode::Prefix => column.name().to_lowercase().starts_with(&token),
        MatchMode::Contains => column.name().to_lowercase().contains(&token),
        MatchMode::Group => column.group.trim().to_lowercase() == token,
    }
}

/// Split a row key into `(Category, Variable)` at the first `.`
pub fn split_row_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(ROW_KEY_SEPARATOR)
}

/// Make value column names distinct from each other and from the derived
/// columns. Repeats get `.1`, `.2`, ... appended in order of appearance.
pub fn unique_column_names(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = FACET_COLUMNS.iter().map(|c| c.to_string()).collect();
    taken.insert(INDEX_NAME.to_string());

    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut n = 1;
            while taken.contains(&candidate) {
                candidate = format!("{}.{}", name, n);
                n += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub category: String,
    pub variable: String,
    pub values: Vec<CellValue>,
}

/// Rows of one transaction type: facets plus prefix-stripped value columns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionTable {
    token: String,
    columns: Vec<String>,
    rows: IndexMap<String, TransactionRow>,
}

impl TransactionTable {
    /// Value columns are renamed with [`unique_column_names`]
    pub fn new(token: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            token: token.into(),
            columns: unique_column_names(columns),
            rows: IndexMap::new(),
        }
    }

    /// Add a row keyed by `key`; values are padded to the column count
    pub fn insert_row(
        &mut self,
        key: impl Into<String>,
        category: impl Into<String>,
        variable: impl Into<String>,
        mut values: Vec<CellValue>,
    ) {
        values.resize(self.columns.len(), CellValue::Empty);
        self.rows.insert(
            key.into(),
            TransactionRow {
                category: category.into(),
                variable: variable.into(),
                values,
            },
        );
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value columns only
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `Unique_ID`, `Category`, `Variable`, then the value columns
    pub fn header(&self) -> Vec<String> {
        let mut header = vec![INDEX_NAME.to_string()];
        header.extend(FACET_COLUMNS.iter().map(|c| c.to_string()));
        header.extend(self.columns.iter().cloned());
        header
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, key: &str) -> Option<&TransactionRow> {
        self.rows.get(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&String, &TransactionRow)> {
        self.rows.iter()
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &String> {
        self.rows.keys()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn value(&self, key: &str, column: &str) -> Option<&CellValue> {
        let col = self.column_position(column)?;
        self.rows.get(key).and_then(|row| row.values.get(col))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display rows: Category, Variable, then values with missing as ""
    pub fn present(&self) -> Vec<Vec<String>> {
        self.rows
            .values()
            .map(|row| {
                let mut line = vec![row.category.clone(), row.variable.clone()];
                line.extend(row.values.iter().map(CellValue::as_text));
                line
            })
            .collect()
    }
}

/// Selects the columns of one transaction type from a [`NormalizedTable`]
pub struct TransactionFilter<'a> {
    mode: MatchMode,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> TransactionFilter<'a> {
    pub fn new(mode: MatchMode, diagnostics: &'a dyn Diagnostics) -> Self {
        Self { mode, diagnostics }
    }

    /// Filter `table` down to the columns matching `token`.
    ///
    /// Whitespace-only cells count as missing, rows missing every selected
    /// value are dropped, and so are rows whose key has no `.`. Fails with
    /// `SelectionMismatch` when no column matches.
    pub fn filter(&self, table: &NormalizedTable, token: &str) -> Result<TransactionTable> {
        let token = token.trim();
        self.diagnostics.info(&format!(
            "Initial table shape: ({}, {})",
            table.row_count(),
            table.column_count()
        ));
        self.diagnostics.info(&format!(
            "Selecting columns for '{}' using {} match",
            token, self.mode
        ));

        let selected: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column_matches(column, token, self.mode))
            .filter(|(_, column)| {
                let name = column.suffix();
                let is_facet = name == INDEX_NAME || FACET_COLUMNS.contains(&name.as_str());
                if is_facet {
                    self.diagnostics.warn(&format!(
                        "Column '{}' would shadow a derived column and is skipped",
                        column
                    ));
                }
                !is_facet
            })
            .map(|(i, _)| i)
            .collect();

        if selected.is_empty() {
            self.diagnostics
                .warn(&format!("No columns match transaction type '{}'", token));
            return Err(TrnError::selection_mismatch(token));
        }
        self.diagnostics.info(&format!(
            "Filtered table shape (after column selection): ({}, {})",
            table.row_count(),
            selected.len()
        ));

        let columns = selected
            .iter()
            .map(|&i| table.columns()[i].suffix())
            .collect();
        let mut result = TransactionTable::new(token, columns);

        let mut non_empty_rows = 0usize;
        for (key, row) in table.rows() {
            let values: Vec<CellValue> = selected
                .iter()
                .map(|&i| match &row[i] {
                    v if v.is_blank() => CellValue::Empty,
                    v => v.clone(),
                })
                .collect();
            if values.iter().all(CellValue::is_missing) {
                continue;
            }
            non_empty_rows += 1;

            if let Some((category, variable)) = split_row_key(key) {
                result.insert_row(key.clone(), category, variable, values);
            }
        }
        self.diagnostics.info(&format!(
            "Filtered table shape (after dropping empty rows): ({}, {})",
            non_empty_rows,
            result.columns().len()
        ));
        self.diagnostics.info(&format!(
            "Processed transaction data for type: {} with {} rows",
            token,
            result.row_count()
        ));

        Ok(result)
    }

    /// Like [`filter`](Self::filter) but failures become an empty table
    pub fn filter_or_empty(&self, table: &NormalizedTable, token: &str) -> TransactionTable {
        match self.filter(table, token) {
            Ok(result) => result,
            Err(e) => {
                self.diagnostics
                    .error(&format!("Error processing transaction data: {}", e));
                TransactionTable::new(token.trim(), Vec::new())
            }
        }
    }
}
