//! FILENAME: persistence/src/error.rs

use engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Options mismatch: reader expects {expected}, got {found}")]
    OptionsMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("No reader registered for {0}")]
    NoReader(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
