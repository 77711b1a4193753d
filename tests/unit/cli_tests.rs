//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use std::path::PathBuf;
use trnmodel::cli::{Cli, Commands};

#[test]
fn test_cli_types_command() {
    let cli = Cli::try_parse_from(["trnmodel", "types", "model.xlsx"]).unwrap();
    match cli.command {
        Commands::Types {
            file,
            common_with,
            format,
        } => {
            assert_eq!(file, PathBuf::from("model.xlsx"));
            assert!(common_with.is_none());
            assert_eq!(format, "pretty");
        }
        _ => panic!("Expected Types command"),
    }
}

#[test]
fn test_cli_types_command_with_common() {
    let cli = Cli::try_parse_from([
        "trnmodel",
        "types",
        "a.xlsx",
        "--common-with",
        "b.xlsx",
        "--format",
        "json",
    ])
    .unwrap();
    match cli.command {
        Commands::Types {
            common_with, format, ..
        } => {
            assert_eq!(common_with, Some(PathBuf::from("b.xlsx")));
            assert_eq!(format, "json");
        }
        _ => panic!("Expected Types command"),
    }
}

#[test]
fn test_cli_show_command() {
    let cli = Cli::try_parse_from(["trnmodel", "show", "model.xlsx", "--type", "TypeA"]).unwrap();
    match cli.command {
        Commands::Show {
            file,
            transaction_type,
            format,
        } => {
            assert_eq!(file, PathBuf::from("model.xlsx"));
            assert_eq!(transaction_type, "TypeA");
            assert_eq!(format, "pretty");
        }
        _ => panic!("Expected Show command"),
    }
}

#[test]
fn test_cli_show_requires_type() {
    assert!(Cli::try_parse_from(["trnmodel", "show", "model.xlsx"]).is_err());
}

#[test]
fn test_cli_compare_command() {
    let cli = Cli::try_parse_from([
        "trnmodel", "compare", "old.xlsx", "new.xlsx", "--type", "TypeA", "--cells",
    ])
    .unwrap();
    match cli.command {
        Commands::Compare {
            file1,
            file2,
            transaction_type,
            cells,
            ..
        } => {
            assert_eq!(file1, PathBuf::from("old.xlsx"));
            assert_eq!(file2, PathBuf::from("new.xlsx"));
            assert_eq!(transaction_type, "TypeA");
            assert!(cells);
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_cli_compare_types_command() {
    let cli = Cli::try_parse_from([
        "trnmodel",
        "compare-types",
        "model.xlsx",
        "--left",
        "TypeA",
        "--right",
        "TypeB",
    ])
    .unwrap();
    match cli.command {
        Commands::CompareTypes {
            left, right, cells, ..
        } => {
            assert_eq!(left, "TypeA");
            assert_eq!(right, "TypeB");
            assert!(!cells);
        }
        _ => panic!("Expected CompareTypes command"),
    }
}

#[test]
fn test_cli_global_flags() {
    let cli = Cli::try_parse_from([
        "trnmodel",
        "types",
        "model.xlsx",
        "--verbose",
        "--sheet",
        "Model",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.sheet.as_deref(), Some("Model"));
}

#[test]
fn test_cli_rejects_unknown_match_mode() {
    assert!(Cli::try_parse_from(["trnmodel", "--match-mode", "regex", "types", "m.xlsx"]).is_err());
}
