//! Output formatting utilities

use crate::diff::{CellChange, ChangeType, ComparisonReport};
use crate::error::Result;
use crate::filter::TransactionTable;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Pretty printer for trnmodel output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the transaction types of one or two workbooks
    pub fn print_transaction_types(types: &BTreeSet<String>) {
        print!("{}", Self::render_transaction_types(types));
    }

    pub fn render_transaction_types(types: &BTreeSet<String>) -> String {
        let mut out = String::new();
        if types.is_empty() {
            out.push_str("No transaction types found.\n");
            return out;
        }

        let _ = writeln!(out, "📋 Transaction Types:");
        for (i, name) in types.iter().enumerate() {
            let prefix = if i == types.len() - 1 { "└─" } else { "├─" };
            let _ = writeln!(out, "{} {}", prefix, name);
        }
        out
    }

    /// Print the rows of one transaction type
    pub fn print_transaction_table(table: &TransactionTable) {
        print!("{}", Self::render_transaction_table(table));
    }

    pub fn render_transaction_table(table: &TransactionTable) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Transaction Type: {}", table.token());
        let _ = writeln!(out);

        if table.is_empty() {
            out.push_str("No rows for this transaction type.\n");
            return out;
        }

        let mut header = vec!["Category".to_string(), "Variable".to_string()];
        header.extend(table.columns().iter().cloned());
        let _ = writeln!(out, "{}", header.join(" | "));
        for line in table.present() {
            let _ = writeln!(out, "{}", line.join(" | "));
        }
        out
    }

    /// Print a comparison summary, its records and optionally the differing cells
    pub fn print_comparison(report: &ComparisonReport, show_cells: bool) {
        print!("{}", Self::render_comparison(report, show_cells));
    }

    pub fn render_comparison(report: &ComparisonReport, show_cells: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "🔍 Comparison: {} → {}",
            report.left_label, report.right_label
        );

        if !report.has_differences() {
            let _ = writeln!(out, "└─ ✅ No differences");
            return out;
        }

        let _ = writeln!(out, "├─ Removed: {}", report.count(ChangeType::Removed));
        let _ = writeln!(out, "├─ Changed: {}", report.count(ChangeType::Changed));
        let _ = writeln!(out, "└─ Added: {}", report.count(ChangeType::Added));
        let _ = writeln!(out);

        let _ = writeln!(out, "Category | Variable | Column | Change Type | From | To");
        for record in &report.records {
            let _ = writeln!(
                out,
                "{} | {} | {} | {} | {} | {}",
                record.category,
                record.variable,
                record.column,
                record.change_type,
                record.from,
                record.to
            );
        }

        if show_cells {
            let _ = writeln!(out);
            let _ = writeln!(out, "Differing rows ({}):", report.rows.len());
            for row in &report.rows {
                let _ = writeln!(out, "● {} / {}", row.category, row.variable);
                let changed: Vec<_> = row
                    .cells
                    .iter()
                    .filter(|c| c.change != CellChange::Unchanged)
                    .collect();
                for (i, cell) in changed.iter().enumerate() {
                    let prefix = if i == changed.len() - 1 { "└─" } else { "├─" };
                    let _ = writeln!(
                        out,
                        "  {} [{}] {}: '{}' → '{}'",
                        prefix,
                        change_marker(cell.change),
                        cell.column,
                        cell.left.as_text(),
                        cell.right.as_text()
                    );
                }
            }
        }
        out
    }
}

fn change_marker(change: CellChange) -> &'static str {
    match change {
        CellChange::Added => "+",
        CellChange::Removed => "-",
        CellChange::Changed => "~",
        CellChange::Unchanged => " ",
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Transaction table as `{ transaction_type, columns, rows: [{Unique_ID, Category, Variable, ...}] }`
    pub fn format_transaction_table(table: &TransactionTable) -> Result<String> {
        let header = table.header();
        let mut rows = Vec::with_capacity(table.row_count());
        for (key, row) in table.rows() {
            let mut object = serde_json::Map::new();
            object.insert(header[0].clone(), serde_json::json!(key));
            object.insert(header[1].clone(), serde_json::json!(row.category));
            object.insert(header[2].clone(), serde_json::json!(row.variable));
            // Value column names are unique and never shadow the derived columns
            for (column, value) in table.columns().iter().zip(&row.values) {
                object.insert(column.clone(), serde_json::to_value(value)?);
            }
            rows.push(serde_json::Value::Object(object));
        }

        let json = serde_json::json!({
            "transaction_type": table.token(),
            "columns": header,
            "rows": rows,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}
