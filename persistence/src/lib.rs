//! FILENAME: persistence/src/lib.rs
//! Persistence Module
//!
//! Loads external sources (CSV, TSV, JSON, XLSX) into engine tables through
//! a registry of readers keyed by options type, file extension and MIME
//! type, and writes tables back out as CSV.

pub mod column_builder;
pub mod csv_reader;
pub mod csv_writer;
mod error;
pub mod json_reader;
pub mod reader;
pub mod registry;
pub mod source;
pub mod xlsx_reader;

pub use column_builder::{CellValue, ColumnBuilder, DEFAULT_DATE_TIME_FORMATS};
pub use csv_reader::{CsvReadOptions, CsvReader};
pub use csv_writer::{CsvWriteOptions, CsvWriter};
pub use error::PersistenceError;
pub use json_reader::{JsonReadOptions, JsonReader};
pub use reader::{downcast_options, options_type_key, MultiTableReader, ReadOptions, TableReader};
pub use registry::{
    register_builtin_readers, KeyKind, ReaderKind, ReaderRegistry, RegisteredReader,
    SharedReaderRegistry,
};
pub use source::{Source, SourceData};
pub use xlsx_reader::{XlsxReadOptions, XlsxReader, XLSX_MIME_TYPE};
