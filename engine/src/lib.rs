//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the column engine.
//! CONTEXT: Re-exports typed columns, tables, the packed date-time codec and
//! the temporal transforms for use by the reader crates.

pub mod column;
pub mod error;
pub mod number_format;
pub mod packed_datetime;
pub mod table;
pub mod temporal;

// Re-export commonly used types at the crate root
pub use column::{Column, ColumnType, DateTimeColumn, DoubleColumn, NumberColumn, StringColumn};
pub use error::{EngineError, EngineResult};
pub use number_format::{format_integer, format_number, NumberFormat};
pub use table::Table;
pub use temporal::{DateTimeTransforms, TemporalColumn, TemporalUnit};
