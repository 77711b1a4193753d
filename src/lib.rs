//! # trnmodel
//!
//! Reconstructs the row and column hierarchy of "Trn Model" workbooks from
//! cell indentation and merged headers, keys every row and column, and
//! filters and diffs the result by transaction type.

pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod diff;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod identifiers;
pub mod output;
pub mod sheet;
pub mod table;
pub mod workbook;

pub use config::TrnConfig;
pub use diagnostics::{CollectingDiagnostics, Diagnostics, LogDiagnostics};
pub use diff::{align, classify_cell, compare, diff_records, differing_rows, CellChange, ChangeType, DiffRecord};
pub use error::{Result, TrnError};
pub use filter::{TransactionFilter, TransactionTable};
pub use table::{list_transaction_types, NormalizedTable, TableLoader};
