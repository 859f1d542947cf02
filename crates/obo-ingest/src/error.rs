//! Error types for the source extractors

use obo_common::OboError;
use thiserror::Error;

/// Result type alias for extractor operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Obo(#[from] OboError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid HTML selector: {0}")]
    Selector(String),

    #[error("Invalid format at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    #[error("Missing required field {field} at line {line}")]
    MissingField { field: String, line: usize },

    #[error("Missing archive entry: {0}")]
    MissingArchiveEntry(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn invalid_format(line: usize, message: impl Into<String>) -> Self {
        IngestError::InvalidFormat {
            line,
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>, line: usize) -> Self {
        IngestError::MissingField {
            field: field.into(),
            line,
        }
    }
}
