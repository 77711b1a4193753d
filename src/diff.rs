//! Alignment and difference reporting between two transaction tables

use crate::filter::{TransactionRow, TransactionTable};
use crate::sheet::CellValue;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// `Column` value of records describing a whole added or removed row
pub const ENTIRE_ROW: &str = "Entire Row";

/// Kind of a reported difference. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChangeType {
    Removed,
    Changed,
    Added,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Removed => "Removed",
            Self::Changed => "Changed",
            Self::Added => "Added",
        };
        f.write_str(name)
    }
}

/// Per-cell classification used for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellChange {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl CellChange {
    pub fn as_change_type(self) -> Option<ChangeType> {
        match self {
            Self::Added => Some(ChangeType::Added),
            Self::Removed => Some(ChangeType::Removed),
            Self::Changed => Some(ChangeType::Changed),
            Self::Unchanged => None,
        }
    }
}

/// Classify a left/right cell pair; `Empty` is missing
pub fn classify_cell(left: &CellValue, right: &CellValue) -> CellChange {
    match (left.is_missing(), right.is_missing()) {
        (true, false) => CellChange::Added,
        (false, true) => CellChange::Removed,
        (false, false) if left != right => CellChange::Changed,
        _ => CellChange::Unchanged,
    }
}

/// One detected difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiffRecord {
    pub category: String,
    pub variable: String,
    pub column: String,
    pub change_type: ChangeType,
    pub from: String,
    pub to: String,
}

fn dedup_columns<'c>(columns: impl Iterator<Item = &'c String>, seen: &mut HashSet<String>) -> Vec<String> {
    columns.filter(|c| seen.insert((*c).clone())).cloned().collect()
}

fn project_row(
    source: &TransactionTable,
    row: Option<&TransactionRow>,
    columns: &[String],
) -> Vec<CellValue> {
    columns
        .iter()
        .map(|column| {
            row.zip(source.column_position(column))
                .and_then(|(row, pos)| row.values.get(pos))
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

/// Outer-join two tables on the row key.
///
/// Both results share the same sorted key set (the union) and the same value
/// columns: the left columns followed by right-only columns, duplicates
/// dropped. Rows absent on one side come back with every value missing;
/// `Category` and `Variable` are taken from whichever side has the row.
pub fn align(left: &TransactionTable, right: &TransactionTable) -> (TransactionTable, TransactionTable) {
    let mut seen = HashSet::new();
    let mut columns = dedup_columns(left.columns().iter(), &mut seen);
    columns.extend(dedup_columns(right.columns().iter(), &mut seen));

    let keys: BTreeSet<&String> = left.row_keys().chain(right.row_keys()).collect();

    let mut aligned_left = TransactionTable::new(left.token(), columns.clone());
    let mut aligned_right = TransactionTable::new(right.token(), columns.clone());

    for key in keys {
        let left_row = left.row(key);
        let right_row = right.row(key);
        let facets = left_row.or(right_row);
        let category = facets.map(|r| r.category.clone()).unwrap_or_default();
        let variable = facets.map(|r| r.variable.clone()).unwrap_or_default();

        aligned_left.insert_row(
            key.clone(),
            category.clone(),
            variable.clone(),
            project_row(left, left_row, &columns),
        );
        aligned_right.insert_row(
            key.clone(),
            category,
            variable,
            project_row(right, right_row, &columns),
        );
    }

    (aligned_left, aligned_right)
}

/// Whether any value column differs between two aligned rows
fn row_differs(left: &TransactionRow, right: &TransactionRow) -> bool {
    left.values
        .iter()
        .zip(&right.values)
        .any(|(l, r)| classify_cell(l, r) != CellChange::Unchanged)
}

/// Keys of rows that differ after alignment, in aligned order
pub fn differing_rows(left: &TransactionTable, right: &TransactionTable) -> Vec<String> {
    let (left, right) = align(left, right);
    left.rows()
        .filter(|(key, row)| right.row(key).map_or(true, |other| row_differs(row, other)))
        .map(|(key, _)| key.clone())
        .collect()
}

/// A row with no present value counts as absent from its side
fn has_values(row: &TransactionRow) -> bool {
    row.values.iter().any(|v| !v.is_missing())
}

fn present_values(row: &TransactionRow) -> String {
    row.values
        .iter()
        .filter(|v| !v.is_missing())
        .map(CellValue::as_text)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sort records: Removed, Changed, Added, then by Category and Variable
pub fn sort_records(records: &mut [DiffRecord]) {
    records.sort_by(|a, b| {
        (a.change_type, &a.category, &a.variable).cmp(&(b.change_type, &b.category, &b.variable))
    });
}

/// Every difference between `left` and `right`, sorted for reporting
pub fn diff_records(left: &TransactionTable, right: &TransactionTable) -> Vec<DiffRecord> {
    let (aligned_left, aligned_right) = align(left, right);
    let columns = aligned_left.columns().to_vec();
    let mut records = Vec::new();

    for (key, left_row) in aligned_left.rows() {
        let right_row = match aligned_right.row(key) {
            Some(row) => row,
            None => continue,
        };

        match (has_values(left_row), has_values(right_row)) {
            (false, false) => {}
            (false, true) => records.push(DiffRecord {
                category: right_row.category.clone(),
                variable: right_row.variable.clone(),
                column: ENTIRE_ROW.to_string(),
                change_type: ChangeType::Added,
                from: String::new(),
                to: present_values(right_row),
            }),
            (true, false) => records.push(DiffRecord {
                category: left_row.category.clone(),
                variable: left_row.variable.clone(),
                column: ENTIRE_ROW.to_string(),
                change_type: ChangeType::Removed,
                from: present_values(left_row),
                to: String::new(),
            }),
            (true, true) => {
                for (column, (l, r)) in columns.iter().zip(left_row.values.iter().zip(&right_row.values)) {
                    if let Some(change_type) = classify_cell(l, r).as_change_type() {
                        records.push(DiffRecord {
                            category: left_row.category.clone(),
                            variable: left_row.variable.clone(),
                            column: column.clone(),
                            change_type,
                            from: l.to_string(),
                            to: r.to_string(),
                        });
                    }
                }
            }
        }
    }

    sort_records(&mut records);
    records
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDiff {
    pub column: String,
    pub left: CellValue,
    pub right: CellValue,
    pub change: CellChange,
}

/// An aligned row that differs between the two sides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDiff {
    pub key: String,
    pub category: String,
    pub variable: String,
    pub cells: Vec<CellDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub left_label: String,
    pub right_label: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowDiff>,
    pub records: Vec<DiffRecord>,
}

impl ComparisonReport {
    pub fn has_differences(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn count(&self, change_type: ChangeType) -> usize {
        self.records
            .iter()
            .filter(|r| r.change_type == change_type)
            .count()
    }
}

/// Differences-only view of two tables plus their diff records
pub fn compare(
    left: &TransactionTable,
    right: &TransactionTable,
    left_label: &str,
    right_label: &str,
) -> ComparisonReport {
    let (aligned_left, aligned_right) = align(left, right);
    let columns = aligned_left.columns().to_vec();
    let differing: HashSet<String> = differing_rows(left, right).into_iter().collect();

    let rows = aligned_left
        .rows()
        .filter(|(key, _)| differing.contains(*key))
        .filter_map(|(key, left_row)| {
            let right_row = aligned_right.row(key)?;
            let cells = columns
                .iter()
                .zip(left_row.values.iter().zip(&right_row.values))
                .map(|(column, (l, r))| CellDiff {
                    column: column.clone(),
                    left: l.clone(),
                    right: r.clone(),
                    change: classify_cell(l, r),
                })
                .collect();
            Some(RowDiff {
                key: key.clone(),
                category: left_row.category.clone(),
                variable: left_row.variable.clone(),
                cells,
            })
        })
        .collect();

    ComparisonReport {
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        columns,
        rows,
        records: diff_records(left, right),
    }
}
