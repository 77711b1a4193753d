//! Row key and column key synthesis

use crate::diagnostics::Diagnostics;
use crate::error::TrnError;
use crate::sheet::{RawSheet, PLACEHOLDER_MARKER};
use serde::Serialize;
use std::fmt;

/// Header of the column supplying the row key suffix
pub const VARIABLE_COLUMN: &str = "Variable";

/// Separates the hierarchy from the variable in a row key
pub const ROW_KEY_SEPARATOR: char = '.';

/// Separates the group label from the sub-label in a column name
pub const COLUMN_KEY_SEPARATOR: char = '_';

/// Column names starting with this never resolved to a real label
pub const UNRESOLVED_PREFIX: &str = "Unnamed_Unnamed";

/// `hierarchy.variable`, or just `hierarchy` when the variable is absent
pub fn row_key(hierarchy: &str, variable: Option<&str>) -> String {
    match variable.map(str::trim).filter(|v| !v.is_empty()) {
        Some(variable) => format!("{}{}{}", hierarchy, ROW_KEY_SEPARATOR, variable),
        None => hierarchy.to_string(),
    }
}

/// Structured column identifier.
///
/// `group` is the forward-filled header label, `label` the value of the first
/// data row in that column. `header` and `source_index` describe where the
/// column came from in the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnKey {
    pub group: String,
    pub label: String,
    pub header: String,
    pub source_index: usize,
}

impl ColumnKey {
    pub fn new(
        group: impl Into<String>,
        label: impl Into<String>,
        header: impl Into<String>,
        source_index: usize,
    ) -> Self {
        Self {
            group: group.into(),
            label: label.into(),
            header: header.into(),
            source_index,
        }
    }

    /// `group_label`, whichever of the two is non-empty, or the raw header
    pub fn name(&self) -> String {
        match (self.group.is_empty(), self.label.is_empty()) {
            (false, false) => format!("{}{}{}", self.group, COLUMN_KEY_SEPARATOR, self.label),
            (false, true) => self.group.clone(),
            (true, false) => self.label.clone(),
            (true, true) => self.header.clone(),
        }
    }

    /// The sheet header was a blank-cell placeholder
    pub fn has_placeholder_header(&self) -> bool {
        self.header.contains(PLACEHOLDER_MARKER)
    }

    /// Name still carries the doubled placeholder marker
    pub fn is_unresolved(&self) -> bool {
        self.name().starts_with(UNRESOLVED_PREFIX)
    }

    /// Name with everything up to and including the first `_` removed
    pub fn suffix(&self) -> String {
        let name = self.name();
        match name.split_once(COLUMN_KEY_SEPARATOR) {
            Some((_, rest)) => rest.to_string(),
            None => name,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Builds row keys and column keys for a sheet
pub struct IdentifierGenerator<'a> {
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> IdentifierGenerator<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// One row key per data row. Rows beyond the end of `hierarchy` get an
    /// empty hierarchy string.
    pub fn row_keys(&self, sheet: &RawSheet, hierarchy: &[String]) -> Vec<String> {
        let rows = sheet.data_rows();
        if hierarchy.len() < rows.len() {
            self.diagnostics.warn(&format!(
                "Hierarchy covers {} of {} rows; remaining rows have no hierarchy",
                hierarchy.len(),
                rows.len()
            ));
        }

        let variable_col = sheet.column_index(VARIABLE_COLUMN);
        if variable_col.is_none() {
            self.diagnostics
                .warn("No 'Variable' column found; row keys use the hierarchy only");
        }

        let keys: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let hier = hierarchy.get(i).map(String::as_str).unwrap_or("");
                let variable = variable_col.and_then(|col| row[col].value.trimmed());
                row_key(hier, variable.as_deref())
            })
            .collect();

        self.diagnostics
            .info(&format!("Generated {} row identifiers", keys.len()));
        keys
    }

    /// One column key per sheet column, left to right.
    ///
    /// Placeholder headers take the last real header when the first data row
    /// has a value there, otherwise `Unnamed_<header>`.
    pub fn column_keys(&self, sheet: &RawSheet) -> Vec<ColumnKey> {
        let mut last_valid = String::new();
        let mut keys = Vec::with_capacity(sheet.width());

        for (col, header) in sheet.header_names().into_iter().enumerate() {
            let first_row_value = sheet
                .cell(1, col)
                .and_then(|cell| cell.value.trimmed())
                .unwrap_or_default();

            let group = if header.contains(PLACEHOLDER_MARKER) {
                if first_row_value.is_empty() {
                    format!("Unnamed_{}", header)
                } else {
                    last_valid.clone()
                }
            } else {
                last_valid = header.trim().to_string();
                last_valid.clone()
            };

            keys.push(ColumnKey::new(group, first_row_value, header, col));
        }

        let unresolved = keys.iter().filter(|k| k.is_unresolved()).count();
        if unresolved > 0 {
            let err = TrnError::derivation(format!(
                "{} column(s) could not be resolved to a name and are dropped",
                unresolved
            ));
            self.diagnostics.warn(&err.to_string());
        }
        self.diagnostics
            .info(&format!("Generated {} column identifiers", keys.len()));
        keys
    }
}
