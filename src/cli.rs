//! Command-line interface for trnmodel

use crate::config::{MatchMode, TrnConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trnmodel")]
#[command(about = "Reshape, filter and diff Transaction Model workbooks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Worksheet holding the transaction model
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Column selection: "prefix", "group", or "contains"
    #[arg(long, global = true, value_parser = MatchMode::parse)]
    pub match_mode: Option<MatchMode>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Config file and environment, then command-line overrides
    pub fn resolve_config(&self) -> Result<TrnConfig> {
        let mut config = TrnConfig::load(self.config.as_deref())?;
        if let Some(sheet) = &self.sheet {
            config.sheet_name = sheet.clone();
        }
        if let Some(mode) = self.match_mode {
            config.match_mode = mode;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the transaction types of a workbook
    Types {
        /// Workbook path
        file: PathBuf,

        /// Only list types also present in this workbook
        #[arg(long)]
        common_with: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show the rows of one transaction type
    Show {
        /// Workbook path
        file: PathBuf,

        /// Transaction type to select
        #[arg(long = "type")]
        transaction_type: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Compare one transaction type across two workbooks
    Compare {
        /// First workbook
        file1: PathBuf,

        /// Second workbook
        file2: PathBuf,

        /// Transaction type present in both workbooks
        #[arg(long = "type")]
        transaction_type: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Also show the differing cells of each row
        #[arg(long)]
        cells: bool,
    },

    /// Compare two transaction types within one workbook
    CompareTypes {
        /// Workbook path
        file: PathBuf,

        /// First transaction type
        #[arg(long)]
        left: String,

        /// Second transaction type
        #[arg(long)]
        right: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Also show the differing cells of each row
        #[arg(long)]
        cells: bool,
    },
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
