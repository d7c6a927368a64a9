//! FILENAME: persistence/src/csv_reader.rs
//! PURPOSE: Delimited text reader (CSV, TSV) built on the `csv` crate.

use std::any::Any;

use engine::Table;
use serde::{Deserialize, Serialize};

use crate::column_builder::{default_date_time_formats, unique_column_names, CellValue, ColumnBuilder};
use crate::error::PersistenceError;
use crate::reader::{downcast_options, ReadOptions, TableReader};
use crate::source::Source;

pub const CSV_EXTENSION: &str = "csv";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const TSV_EXTENSION: &str = "tsv";
pub const TSV_MIME_TYPE: &str = "text/tab-separated-values";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvReadOptions {
    pub separator: char,
    pub quote_char: char,
    /// Whether the first record holds column names. Without a header,
    /// columns are named C0, C1, ...
    pub header: bool,
    /// Cell texts read as missing, in addition to blank cells.
    pub missing_values: Vec<String>,
    pub date_time_formats: Vec<String>,
    /// Table name; defaults to the source's name.
    pub table_name: Option<String>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        CsvReadOptions {
            separator: ',',
            quote_char: '"',
            header: true,
            missing_values: vec!["NA".to_string(), "N/A".to_string()],
            date_time_formats: default_date_time_formats(),
            table_name: None,
        }
    }
}

impl CsvReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab separated defaults.
    pub fn tsv() -> Self {
        Self::default().with_separator('\t')
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_missing_values(mut self, missing_values: Vec<String>) -> Self {
        self.missing_values = missing_values;
        self
    }

    pub fn with_date_time_formats(mut self, formats: Vec<String>) -> Self {
        self.date_time_formats = formats;
        self
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }
}

impl ReadOptions for CsvReadOptions {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The `csv` crate takes single-byte delimiters and quotes.
pub(crate) fn ascii_byte(c: char, what: &str) -> Result<u8, PersistenceError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(PersistenceError::InvalidOptions(format!(
            "{} must be an ASCII character, got {:?}",
            what, c
        )))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    defaults: CsvReadOptions,
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader whose `read` (without options) uses `defaults`.
    pub fn with_defaults(defaults: CsvReadOptions) -> Self {
        CsvReader { defaults }
    }

    pub fn defaults(&self) -> &CsvReadOptions {
        &self.defaults
    }
}

impl TableReader for CsvReader {
    fn read(&self, source: &Source) -> Result<Table, PersistenceError> {
        read_csv(source, &self.defaults)
    }

    fn read_with(&self, source: &Source, options: &dyn ReadOptions) -> Result<Table, PersistenceError> {
        read_csv(source, downcast_options::<CsvReadOptions>(options)?)
    }
}

pub fn read_csv(source: &Source, options: &CsvReadOptions) -> Result<Table, PersistenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(ascii_byte(options.separator, "separator")?)
        .quote(ascii_byte(options.quote_char, "quote char")?)
        .has_headers(options.header)
        .from_reader(source.open()?);

    let mut builders: Vec<ColumnBuilder> = if options.header {
        let names = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| column_name(i, name))
            .collect();
        unique_column_names(names)
            .into_iter()
            .map(ColumnBuilder::new)
            .collect()
    } else {
        Vec::new()
    };

    for record in reader.records() {
        let record = record?;
        if builders.is_empty() {
            builders = (0..record.len())
                .map(|i| ColumnBuilder::new(column_name(i, "")))
                .collect();
        }
        for (builder, field) in builders.iter_mut().zip(record.iter()) {
            let value = CellValue::infer(field, &options.missing_values, &options.date_time_formats);
            builder.push_text(value, field);
        }
    }

    let name = options
        .table_name
        .clone()
        .unwrap_or_else(|| source.table_name());
    let mut table = Table::new(name);
    for builder in builders {
        table.add_column(builder.build()?)?;
    }

    log::debug!(
        "read csv '{}' from {}: {} rows, {} columns",
        table.name(),
        source.describe(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn column_name(index: usize, header: &str) -> String {
    let trimmed = header.trim();
    if trimmed.is_empty() {
        format!("C{}", index)
    } else {
        trimmed.to_string()
    }
}
