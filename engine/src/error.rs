//! FILENAME: engine/src/error.rs

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::temporal::TemporalUnit;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unsupported temporal unit: {0} is not supported for time windows")]
    UnsupportedTemporalUnit(TemporalUnit),

    #[error("length mismatch: column '{left}' has {left_len} rows but '{right}' has {right_len}")]
    LengthMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    #[error("invalid window size {0}: windows must span at least one unit")]
    InvalidWindowSize(u32),

    #[error("date-time {0} is outside the packable range")]
    DateTimeOutOfRange(NaiveDateTime),

    #[error("row count mismatch: table '{table}' has {expected} rows but column '{column}' has {actual}")]
    RowCountMismatch {
        table: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
