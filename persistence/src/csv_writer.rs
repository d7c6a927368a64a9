//! FILENAME: persistence/src/csv_writer.rs
//! PURPOSE: Writes a table as delimited text.
//! CONTEXT: Cells are rendered with each column's `get_string`, so number
//! columns follow their print formatter and missing cells are empty.

use std::io::Write;

use engine::Table;
use serde::{Deserialize, Serialize};

use crate::csv_reader::ascii_byte;
use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvWriteOptions {
    pub separator: char,
    pub quote_char: char,
    /// Escapes quote characters inside quoted fields. Equal to `quote_char`
    /// means quotes are doubled.
    pub escape_char: char,
    pub header: bool,
    /// "\n", "\r\n" or any other single ASCII character.
    pub line_end: String,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        CsvWriteOptions {
            separator: ',',
            quote_char: '"',
            escape_char: '"',
            header: true,
            line_end: "\n".to_string(),
        }
    }
}

impl CsvWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    pub fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = escape_char;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_line_end(mut self, line_end: impl Into<String>) -> Self {
        self.line_end = line_end.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    options: CsvWriteOptions,
}

impl CsvWriter {
    pub fn new(options: CsvWriteOptions) -> Self {
        CsvWriter { options }
    }

    pub fn options(&self) -> &CsvWriteOptions {
        &self.options
    }

    pub fn separator(&self) -> char {
        self.options.separator
    }

    pub fn quote_char(&self) -> char {
        self.options.quote_char
    }

    pub fn escape_char(&self) -> char {
        self.options.escape_char
    }

    pub fn header(&self) -> bool {
        self.options.header
    }

    pub fn line_end(&self) -> &str {
        &self.options.line_end
    }

    fn terminator(&self) -> Result<csv::Terminator, PersistenceError> {
        let line_end = self.options.line_end.as_str();
        if line_end == "\r\n" {
            return Ok(csv::Terminator::CRLF);
        }
        let mut chars = line_end.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(csv::Terminator::Any(ascii_byte(c, "line end")?)),
            _ => Err(PersistenceError::InvalidOptions(format!(
                "line end must be a single character or \"\\r\\n\", got {:?}",
                line_end
            ))),
        }
    }

    pub fn write<W: Write>(&self, table: &Table, out: W) -> Result<(), PersistenceError> {
        let quote = ascii_byte(self.options.quote_char, "quote char")?;
        let escape = ascii_byte(self.options.escape_char, "escape char")?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(ascii_byte(self.options.separator, "separator")?)
            .quote(quote)
            .escape(escape)
            .double_quote(escape == quote)
            .terminator(self.terminator()?)
            .from_writer(out);

        if self.options.header {
            writer.write_record(table.column_names())?;
        }
        let columns = table.columns();
        for row in 0..table.row_count() {
            writer.write_record(columns.iter().map(|c| c.get_string(row)))?;
        }
        writer.flush()?;

        log::debug!(
            "wrote csv '{}': {} rows, {} columns",
            table.name(),
            table.row_count(),
            table.column_count()
        );
        Ok(())
    }
}
