//! Loading real workbooks: indentation, header forward-fill and filtering

use crate::common::{sample_data, Blank, Indented, Number, TestFixture, Text};
use log::Level;
use trnmodel::commands::select_transaction;
use trnmodel::config::TrnConfig;
use trnmodel::sheet::CellValue;
use trnmodel::workbook::read_sheet;
use trnmodel::{CollectingDiagnostics, TableLoader};

#[test]
fn test_read_sheet_preserves_indentation() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_model(
            "indents.xlsx",
            &[
                vec![Text("Line Item"), Text("Variable")],
                vec![Indented("Revenue", 0), Text("x")],
                vec![Indented("Product", 1), Text("x")],
                vec![Indented("Hardware", 2), Text("x")],
                vec![Indented("Services", 1), Text("x")],
            ],
        )
        .unwrap();

    let diag = CollectingDiagnostics::new();
    let sheet = read_sheet(&path, "Trn Model", &diag).unwrap();
    let indents: Vec<u32> = sheet.rows().iter().map(|row| row[0].indent).collect();
    assert_eq!(indents, vec![0, 0, 1, 2, 1]);
    assert_eq!(sheet.cell(3, 0).unwrap().value, CellValue::text("Hardware"));
}

#[test]
fn test_load_builds_hierarchical_row_keys() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_model(
            "keys.xlsx",
            &[
                vec![Text("Line Item"), Text("Variable"), Text("Amount")],
                vec![Blank, Blank, Text("Total")],
                vec![Indented("Revenue", 0), Text("x"), Number(1.0)],
                vec![Indented("Product", 1), Text("x"), Number(2.0)],
                vec![Indented("Hardware", 2), Text("x"), Number(3.0)],
                vec![Indented("Services", 1), Text("x"), Number(4.0)],
            ],
        )
        .unwrap();

    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let table = TableLoader::new(&config, &diag).load(&path).unwrap();

    let keys: Vec<&String> = table.row_keys().collect();
    assert_eq!(
        keys,
        vec![
            "",
            "Revenue.x",
            "Revenue_Product.x",
            "Revenue_Product_Hardware.x",
            "Revenue_Services.x",
        ]
    );
    assert_eq!(table.column_names(), vec!["Line Item", "Variable", "Amount_Total"]);
    assert_eq!(
        table.value("Revenue_Product_Hardware.x", "Amount_Total"),
        Some(&CellValue::Number(3.0))
    );
}

#[test]
fn test_load_sample_model() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_model("model.xlsx", &sample_data::base_model()).unwrap();

    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let loader = TableLoader::new(&config, &diag);
    let table = loader.load(&path).unwrap();

    assert_eq!(
        &table.column_names()[8..],
        &["TypeA_Value", "TypeA_Rate", "TypeB_Value", "TypeB_Rate"]
    );
    let types: Vec<String> = loader.transaction_types(&table).into_iter().collect();
    assert_eq!(types, vec!["TypeA", "TypeB"]);

    // The blank label row inherits "Cash" at indent 1
    assert!(table.row("Assets_Cash.Fee").is_some());
    assert!(diag.contains(Level::Info, "Finished processing sheet"));
}

#[test]
fn test_select_transaction_from_workbook() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_model("model.xlsx", &sample_data::base_model()).unwrap();

    let config = TrnConfig::default();
    let diag = CollectingDiagnostics::new();
    let result = select_transaction(&config, &diag, &path, "TypeA").unwrap();

    assert_eq!(result.columns(), &["Value", "Rate"]);
    let keys: Vec<&String> = result.row_keys().collect();
    assert_eq!(keys, vec!["Assets_Cash.Balance", "Liabilities.Loan"]);
    assert_eq!(
        result.present(),
        vec![
            vec!["Assets_Cash", "Balance", "200", "0.5"],
            vec!["Liabilities", "Loan", "300", ""],
        ]
    );
}

#[test]
fn test_custom_sheet_name() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_workbook("custom.xlsx", "Model", &sample_data::base_model())
        .unwrap();

    let config = TrnConfig {
        sheet_name: "Model".to_string(),
        ..TrnConfig::default()
    };
    let diag = CollectingDiagnostics::new();
    let result = select_transaction(&config, &diag, &path, "TypeB").unwrap();
    assert_eq!(result.row_count(), 3);
}

#[test]
fn test_sheet_name_with_markup_characters() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_workbook(
            "pnl.xlsx",
            "P&L <Plan>",
            &[
                vec![Text("Line Item"), Text("Variable")],
                vec![Indented("Revenue", 0), Text("x")],
                vec![Indented("Product", 1), Text("x")],
            ],
        )
        .unwrap();

    let diag = CollectingDiagnostics::new();
    let sheet = read_sheet(&path, "P&L <Plan>", &diag).unwrap();
    let indents: Vec<u32> = sheet.rows().iter().map(|row| row[0].indent).collect();
    assert_eq!(indents, vec![0, 0, 1]);
    assert!(!diag.contains(Level::Warn, "Could not read indentation"));
}
