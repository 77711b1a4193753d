//! Edge cases: broken sources, missing sheets, duplicate keys

use crate::common::{sample_data, Blank, Indented, Number, TestFixture, Text};
use log::Level;
use std::path::Path;
use trnmodel::commands::{load_table, select_transaction};
use trnmodel::config::{DuplicateKeyPolicy, TrnConfig};
use trnmodel::workbook::read_sheet;
use trnmodel::{CollectingDiagnostics, TableLoader, TrnError};

#[test]
fn test_missing_sheet() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_workbook("other.xlsx", "Summary", &sample_data::base_model())
        .unwrap();

    let diag = CollectingDiagnostics::new();
    let err = read_sheet(&path, "Trn Model", &diag).unwrap_err();
    assert!(matches!(err, TrnError::SheetNotFound { ref name } if name == "Trn Model"));

    let config = TrnConfig::default();
    let table = TableLoader::new(&config, &diag).load_or_empty(&path);
    assert!(table.is_empty());
    assert!(diag.contains(Level::Error, "Sheet not found: Trn Model"));
}

#[test]
fn test_corrupted_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_corrupted_file("broken.xlsx").unwrap();

    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let loader = TableLoader::new(&config, &diag);

    assert!(loader.load(&path).is_err());
    assert!(loader.load_or_empty(&path).is_empty());
    assert!(diag.contains(Level::Error, "Error processing Excel file"));
}

#[test]
fn test_missing_file() {
    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let err = load_table(&config, &diag, Path::new("/nonexistent/model.xlsx")).unwrap_err();

    assert!(matches!(err, TrnError::SourceRead { .. }));
    assert!(!err.is_selection_mismatch());
}

#[test]
fn test_header_only_workbook_is_unusable() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_model("header.xlsx", &[sample_data::header()])
        .unwrap();

    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let err = load_table(&config, &diag, &path).unwrap_err();
    assert!(matches!(err, TrnError::SourceRead { ref message } if message.contains("No rows")));
}

#[test]
fn test_duplicate_row_keys() {
    let fixture = TestFixture::new().unwrap();
    let mut rows = sample_data::base_model();
    rows.push(sample_data::data_row(
        Indented("Liabilities", 0),
        Text("Loan"),
        [Number(999.0), Blank, Blank, Blank],
    ));
    let path = fixture.create_model("dupes.xlsx", &rows).unwrap();

    let diag = CollectingDiagnostics::new();
    let result = select_transaction(&TrnConfig::default(), &diag, &path, "TypeA").unwrap();
    assert_eq!(result.value("Liabilities.Loan", "Value").unwrap().to_string(), "999");
    assert!(diag.contains(Level::Warn, "Duplicate Unique_ID 'Liabilities.Loan'"));

    let reject = TrnConfig {
        duplicate_keys: DuplicateKeyPolicy::Reject,
        ..TrnConfig::default()
    };
    let err = select_transaction(&reject, &diag, &path, "TypeA").unwrap_err();
    assert!(matches!(err, TrnError::KeyCollision { ref key } if key == "Liabilities.Loan"));
}

#[test]
fn test_unknown_type_is_selection_mismatch() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_model("model.xlsx", &sample_data::base_model()).unwrap();

    let diag = CollectingDiagnostics::new();
    let err = select_transaction(&TrnConfig::default(), &diag, &path, "TypeC").unwrap_err();
    assert!(err.is_selection_mismatch());
}

#[test]
fn test_type_token_is_case_insensitive() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_model("model.xlsx", &sample_data::base_model()).unwrap();

    let diag = CollectingDiagnostics::new();
    let result = select_transaction(&TrnConfig::default(), &diag, &path, " typea ").unwrap();
    assert_eq!(result.row_count(), 2);
}

#[test]
fn test_blank_label_rows_before_first_label() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_model(
            "leading.xlsx",
            &[
                vec![Text("Line Item"), Text("Variable"), Text("Amount")],
                vec![Blank, Blank, Text("Total")],
                vec![Blank, Text("orphan"), Number(1.0)],
                vec![Indented("Revenue", 0), Text("x"), Number(2.0)],
            ],
        )
        .unwrap();

    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let table = TableLoader::new(&config, &diag).load(&path).unwrap();
    let keys: Vec<&String> = table.row_keys().collect();
    assert_eq!(keys, vec!["", ".orphan", "Revenue.x"]);
}
