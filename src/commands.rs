//! Command implementations for trnmodel CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::TrnConfig;
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::diff::{compare, ComparisonReport};
use crate::error::{Result, TrnError};
use crate::filter::{TransactionFilter, TransactionTable};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::table::{common_transaction_types, NormalizedTable, TableLoader};
use std::collections::BTreeSet;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands, config: &TrnConfig) -> Result<()> {
    let diagnostics = LogDiagnostics;
    match command {
        Commands::Types {
            file,
            common_with,
            format,
        } => types_command(config, &diagnostics, &file, common_with.as_deref(), &format),
        Commands::Show {
            file,
            transaction_type,
            format,
        } => show_command(config, &diagnostics, &file, &transaction_type, &format),
        Commands::Compare {
            file1,
            file2,
            transaction_type,
            format,
            cells,
        } => compare_files_command(
            config,
            &diagnostics,
            &file1,
            &file2,
            &transaction_type,
            &format,
            cells,
        ),
        Commands::CompareTypes {
            file,
            left,
            right,
            format,
            cells,
        } => compare_types_command(config, &diagnostics, &file, &left, &right, &format, cells),
    }
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::parse(format).map_err(TrnError::invalid_input)
}

/// Load a workbook, treating a table without rows as unusable
pub fn load_table(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    path: &Path,
) -> Result<(NormalizedTable, BTreeSet<String>)> {
    let loader = TableLoader::new(config, diagnostics);
    let table = loader.load(path)?;
    if table.row_count() == 0 {
        return Err(TrnError::source_read(format!(
            "No rows found in sheet '{}' of {}",
            config.sheet_name,
            path.display()
        )));
    }
    let types = loader.transaction_types(&table);
    Ok((table, types))
}

/// Fails with `SelectionMismatch` unless `token` names one of `types`
pub fn require_type(types: &BTreeSet<String>, token: &str) -> Result<()> {
    let wanted = token.trim().to_lowercase();
    if types.iter().any(|t| t.trim().to_lowercase() == wanted) {
        Ok(())
    } else {
        Err(TrnError::selection_mismatch(token.trim()))
    }
}

/// List transaction types, optionally intersected with a second workbook
fn types_command(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file: &Path,
    common_with: Option<&Path>,
    format: &str,
) -> Result<()> {
    let format = parse_format(format)?;
    let (_, mut types) = load_table(config, diagnostics, file)?;
    if let Some(other) = common_with {
        let (_, other_types) = load_table(config, diagnostics, other)?;
        types = common_transaction_types(&types, &other_types);
    }

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_transaction_types(&types),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&types)?),
    }
    Ok(())
}

/// Show the filtered rows of one transaction type
fn show_command(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file: &Path,
    token: &str,
    format: &str,
) -> Result<()> {
    let format = parse_format(format)?;
    let table = select_transaction(config, diagnostics, file, token)?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_transaction_table(&table),
        OutputFormat::Json => println!("{}", JsonFormatter::format_transaction_table(&table)?),
    }
    Ok(())
}

/// Load `file` and filter it for `token`
pub fn select_transaction(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file: &Path,
    token: &str,
) -> Result<TransactionTable> {
    let (table, types) = load_table(config, diagnostics, file)?;
    require_type(&types, token)?;
    TransactionFilter::new(config.match_mode, diagnostics).filter(&table, token)
}

/// Compare one transaction type across two workbooks
pub fn compare_files(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file1: &Path,
    file2: &Path,
    token: &str,
) -> Result<ComparisonReport> {
    let (table1, types1) = load_table(config, diagnostics, file1)?;
    let (table2, types2) = load_table(config, diagnostics, file2)?;
    require_type(&common_transaction_types(&types1, &types2), token)?;

    let filter = TransactionFilter::new(config.match_mode, diagnostics);
    let left = filter.filter(&table1, token)?;
    let right = filter.filter(&table2, token)?;

    Ok(compare(
        &left,
        &right,
        &file1.display().to_string(),
        &file2.display().to_string(),
    ))
}

/// Compare two transaction types within one workbook
pub fn compare_types(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file: &Path,
    left_token: &str,
    right_token: &str,
) -> Result<ComparisonReport> {
    let (table, types) = load_table(config, diagnostics, file)?;
    require_type(&types, left_token)?;
    require_type(&types, right_token)?;

    let filter = TransactionFilter::new(config.match_mode, diagnostics);
    let left = filter.filter(&table, left_token)?;
    let right = filter.filter(&table, right_token)?;

    Ok(compare(&left, &right, left_token.trim(), right_token.trim()))
}

fn print_report(report: &ComparisonReport, format: OutputFormat, cells: bool) -> Result<()> {
    match format {
        OutputFormat::Pretty => PrettyPrinter::print_comparison(report, cells),
        OutputFormat::Json if cells => println!("{}", JsonFormatter::format(report)?),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&report.records)?),
    }
    Ok(())
}

fn compare_files_command(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file1: &Path,
    file2: &Path,
    token: &str,
    format: &str,
    cells: bool,
) -> Result<()> {
    let format = parse_format(format)?;
    let report = compare_files(config, diagnostics, file1, file2, token)?;
    print_report(&report, format, cells)
}

fn compare_types_command(
    config: &TrnConfig,
    diagnostics: &dyn Diagnostics,
    file: &Path,
    left: &str,
    right: &str,
    format: &str,
    cells: bool,
) -> Result<()> {
    let format = parse_format(format)?;
    let report = compare_types(config, diagnostics, file, left, right)?;
    print_report(&report, format, cells)
}
