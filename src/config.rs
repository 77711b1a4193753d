//! Engine configuration: defaults, JSON file and environment overrides

use crate::error::{Result, TrnError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;

/// Sheet holding the transaction model
pub const DEFAULT_SHEET_NAME: &str = "Trn Model";

/// Number of leading metadata columns before the transaction-type columns
pub const DEFAULT_TRANSACTION_OFFSET: usize = 8;

/// How a transaction-type token selects columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Column name starts with the token, ignoring case
    #[default]
    Prefix,
    /// Column group label equals the token, ignoring case
    Group,
    /// Token appears anywhere in the column name, ignoring case
    Contains,
}

impl MatchMode {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "group" => Ok(Self::Group),
            "contains" => Ok(Self::Contains),
            _ => Err(format!(
                "Invalid match mode: {}. Use 'prefix', 'group', or 'contains'",
                s
            )),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prefix => "prefix",
            Self::Group => "group",
            Self::Contains => "contains",
        };
        f.write_str(name)
    }
}

/// What to do when two rows produce the same row key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKeyPolicy {
    /// Later row replaces the earlier one, with a warning
    #[default]
    Overwrite,
    /// Loading fails
    Reject,
}

impl DuplicateKeyPolicy {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            _ => Err(format!(
                "Invalid duplicate key policy: {}. Use 'overwrite' or 'reject'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrnConfig {
    pub sheet_name: String,
    pub transaction_offset: usize,
    pub match_mode: MatchMode,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl Default for TrnConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            transaction_offset: DEFAULT_TRANSACTION_OFFSET,
            match_mode: MatchMode::default(),
            duplicate_keys: DuplicateKeyPolicy::default(),
        }
    }
}

impl TrnConfig {
    /// Defaults, then the optional JSON file, then environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(TrnError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            TrnError::config(format!("Invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Override fields from `TRN_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("TRN_SHEET_NAME") {
            if !name.trim().is_empty() {
                self.sheet_name = name;
            }
        }

        if let Some(offset) = lookup("TRN_TRANSACTION_OFFSET") {
            self.transaction_offset = offset.trim().parse().map_err(|_| {
                TrnError::config(format!("Invalid TRN_TRANSACTION_OFFSET: '{}'", offset))
            })?;
        }

        if let Some(mode) = lookup("TRN_MATCH_MODE") {
            self.match_mode = MatchMode::parse(&mode).map_err(TrnError::config)?;
        }

        if let Some(policy) = lookup("TRN_DUPLICATE_KEYS") {
            self.duplicate_keys = DuplicateKeyPolicy::parse(&policy).map_err(TrnError::config)?;
        }

        Ok(())
    }
}
