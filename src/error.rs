//! Error types for trnmodel operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrnError>;

#[derive(Error, Debug)]
pub enum TrnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Source read error: {message}")]
    SourceRead { message: String },

    #[error("Cannot derive identifier: {message}")]
    DerivationAmbiguity { message: String },

    #[error("Duplicate row key: {key}")]
    KeyCollision { key: String },

    #[error("Transaction type not found: {token}")]
    SelectionMismatch { token: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl TrnError {
    pub fn sheet_not_found(name: impl Into<String>) -> Self {
        Self::SheetNotFound { name: name.into() }
    }

    pub fn source_read(msg: impl Into<String>) -> Self {
        Self::SourceRead {
            message: msg.into(),
        }
    }

    pub fn derivation(msg: impl Into<String>) -> Self {
        Self::DerivationAmbiguity {
            message: msg.into(),
        }
    }

    pub fn key_collision(key: impl Into<String>) -> Self {
        Self::KeyCollision { key: key.into() }
    }

    pub fn selection_mismatch(token: impl Into<String>) -> Self {
        Self::SelectionMismatch {
            token: token.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Whether this error means "the requested transaction type is not there"
    /// rather than a broken source.
    pub fn is_selection_mismatch(&self) -> bool {
        matches!(self, Self::SelectionMismatch { .. })
    }
}
